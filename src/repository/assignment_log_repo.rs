// ==========================================
// CRM 线索分配引擎 - 分配审计数据仓储
// ==========================================
// 对齐: assignment_log 表
// 红线: 只追加，不更新不删除
// ==========================================

mod core;
mod queries;


pub use self::core::AssignmentLogRepository;
