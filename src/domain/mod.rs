// ==========================================
// CRM 线索分配引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation_rule;
pub mod assignment;
pub mod lead;
pub mod salesperson;
pub mod types;

// 重导出核心类型
pub use allocation_rule::AllocationRule;
pub use assignment::{AssignmentRecord, BatchSummary};
pub use lead::Lead;
pub use salesperson::Salesperson;
pub use types::AssignMethod;
