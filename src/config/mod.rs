// ==========================================
// CRM 线索分配引擎 - 配置层
// ==========================================
// 职责: 系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod allocation_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use allocation_config_trait::{AllocationConfig, AllocationConfigReader, ConfigResult};
pub use config_manager::{config_keys, ConfigManager};
