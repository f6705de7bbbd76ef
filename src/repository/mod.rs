// ==========================================
// CRM 线索分配引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 以 SQLite 实现引擎层定义的协作者接口
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod allocation_rule_repo;
pub mod assignment_log_repo;
pub mod error;
pub mod lead_repo;
pub mod salesperson_repo;

// 重导出核心仓储
pub use allocation_rule_repo::{AllocationRuleRepository, NewAllocationRule};
pub use assignment_log_repo::AssignmentLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use lead_repo::LeadRepository;
pub use salesperson_repo::SalespersonRepository;
