// ==========================================
// CRM 线索分配引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 规则路由 + 负载均衡兜底的线索分配
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与定时任务
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{AllocationRule, AssignMethod, AssignmentRecord, BatchSummary, Lead, Salesperson};

// 引擎
pub use engine::{AllocationEngine, AllocationError, AllocationRepositories};

// API
pub use api::{AllocationApi, ApiError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "CRM 线索分配引擎";
