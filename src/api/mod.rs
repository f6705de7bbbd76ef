// ==========================================
// CRM 线索分配引擎 - API 层
// ==========================================
// 职责: 面向线索创建流程与运营触发的业务接口
// ==========================================

pub mod allocation_api;
pub mod error;

pub use allocation_api::AllocationApi;
pub use error::{ApiError, ApiResult};
