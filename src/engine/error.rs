// ==========================================
// CRM 线索分配引擎 - 引擎层错误类型
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 分配引擎错误
#[derive(Error, Debug)]
pub enum AllocationError {
    /// 无任何在岗销售，整批/单条均无法分配
    #[error("无在岗销售人员，无法分配")]
    NoActiveWorkers,

    /// 线索在快照读取与提交之间已被认领或终结
    #[error("线索已被认领或已终结: lead_id={lead_id}")]
    StaleWorkItem { lead_id: i64 },

    #[error("线索不存在: lead_id={0}")]
    LeadNotFound(i64),

    /// 线索/人员写入失败，该条提交已整体放弃
    #[error("持久化失败: {0}")]
    Persistence(#[source] RepositoryError),

    /// 审计写入失败（分配本身已生效）
    #[error("审计写入失败: lead_id={lead_id}, {source}")]
    AuditWrite {
        lead_id: i64,
        #[source]
        source: RepositoryError,
    },

    #[error("分配运行锁获取失败: {0}")]
    Lock(String),
}

impl From<RepositoryError> for AllocationError {
    fn from(err: RepositoryError) -> Self {
        AllocationError::Persistence(err)
    }
}

pub type AllocationResult<T> = Result<T, AllocationError>;
