// ==========================================
// CRM 线索分配引擎 - 应用层
// ==========================================
// 职责: 组装共享状态，托管定时批量分配
// ==========================================

pub mod batch_job;
pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
