// ==========================================
// CRM 线索分配引擎 - 线索分配 API
// ==========================================
// 职责: 创建后自动分配、运营触发批量分配、分配审计查询
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AllocationConfig, ConfigManager};
use crate::domain::{AssignmentRecord, BatchSummary};
use crate::engine::AllocationEngine;
use crate::repository::AssignmentLogRepository;

/// 审计查询条数上限
const MAX_AUDIT_QUERY_LIMIT: usize = 500;

// ==========================================
// AllocationApi - 线索分配 API
// ==========================================
pub struct AllocationApi {
    engine: Arc<AllocationEngine>,
    config_manager: Arc<ConfigManager>,
    assignment_log_repo: Arc<AssignmentLogRepository>,
}

impl AllocationApi {
    pub fn new(
        engine: Arc<AllocationEngine>,
        config_manager: Arc<ConfigManager>,
        assignment_log_repo: Arc<AssignmentLogRepository>,
    ) -> Self {
        Self {
            engine,
            config_manager,
            assignment_log_repo,
        }
    }

    fn load_config(&self) -> AllocationConfig {
        match self.config_manager.load_allocation_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "分配配置读取失败，使用默认配置");
                AllocationConfig::default()
            }
        }
    }

    /// 线索创建后自动分配（尽力而为）
    ///
    /// 永不向调用方返回错误，失败只记录日志，不得阻断线索创建。
    ///
    /// # 返回
    /// - true: 已分配
    /// - false: 未启用自动分配、无需分配或分配失败
    pub fn on_lead_created(&self, lead_id: i64) -> bool {
        if !self.load_config().auto_assign_enabled {
            tracing::debug!(lead_id, "自动分配未启用");
            return false;
        }

        match self.engine.assign_one(lead_id) {
            Ok(assigned) => assigned,
            Err(e) => {
                tracing::warn!(lead_id, error = %e, "线索自动分配失败，保留待批量分配");
                false
            }
        }
    }

    /// 人工触发单条分配（错误原样返回给操作人员）
    pub fn assign_lead(&self, lead_id: i64) -> ApiResult<bool> {
        if lead_id <= 0 {
            return Err(ApiError::InvalidInput(format!("线索ID无效: {}", lead_id)));
        }
        Ok(self.engine.assign_one(lead_id)?)
    }

    /// 批量分配
    ///
    /// # 参数
    /// - limit: 本批最多处理条数；None 取配置默认值，超过上限截断
    pub fn run_batch(&self, limit: Option<usize>) -> ApiResult<BatchSummary> {
        let config = self.load_config();
        let limit = config
            .resolve_limit(limit)
            .ok_or_else(|| ApiError::InvalidInput("批量条数必须大于0".to_string()))?;

        Ok(self.engine.run_batch(limit)?)
    }

    /// 查询线索的分配审计记录
    pub fn list_lead_assignments(&self, lead_id: i64) -> ApiResult<Vec<AssignmentRecord>> {
        Ok(self.assignment_log_repo.find_by_lead_id(lead_id)?)
    }

    /// 查询最近的分配审计记录
    pub fn list_recent_assignments(&self, limit: usize) -> ApiResult<Vec<AssignmentRecord>> {
        if limit == 0 || limit > MAX_AUDIT_QUERY_LIMIT {
            return Err(ApiError::InvalidInput(format!(
                "查询条数必须在1到{}之间",
                MAX_AUDIT_QUERY_LIMIT
            )));
        }
        Ok(self.assignment_log_repo.find_recent(limit)?)
    }
}
