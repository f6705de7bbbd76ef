// ==========================================
// CRM 线索分配引擎 - 引擎层协作者接口与仓储聚合
// ==========================================
// 职责: 定义引擎依赖的外部协作者 trait（依赖倒置）
// 说明: Engine 层定义 trait，Repository 层提供 SQLite 实现
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::domain::{AllocationRule, AssignMethod, AssignmentRecord, Lead, Salesperson};
use crate::repository::RepositoryResult;

/// 规则存储：只读访问启用中的分配规则
pub trait RuleStore: Send + Sync {
    /// 列出启用规则（顺序稳定，先匹配者优先）
    fn list_active_rules(&self) -> RepositoryResult<Vec<AllocationRule>>;
}

/// 销售人员注册表：读取在岗人员
pub trait WorkerRegistry: Send + Sync {
    fn list_active_workers(&self) -> RepositoryResult<Vec<Salesperson>>;
}

/// 线索来源：读取待分配线索并提交分配结果
pub trait WorkItemSource: Send + Sync {
    /// 列出未分配且未终结的线索（最早创建优先）
    fn list_unassigned_leads(&self, limit: usize) -> RepositoryResult<Vec<Lead>>;

    /// 按ID查询线索
    fn find_lead(&self, lead_id: i64) -> RepositoryResult<Option<Lead>>;

    /// 提交分配
    ///
    /// 线索认领与人员计数递增必须原子生效：
    /// - 线索已被认领/终结 → `RepositoryError::StaleRecord`，不做任何修改
    /// - 其他失败 → 全部回滚
    fn commit_assignment(
        &self,
        lead_id: i64,
        salesperson_id: i64,
        method: AssignMethod,
        assigned_at: NaiveDateTime,
    ) -> RepositoryResult<()>;
}

/// 审计日志：只追加
pub trait AuditLog: Send + Sync {
    fn append(&self, record: &AssignmentRecord) -> RepositoryResult<()>;
}

/// 分配引擎仓储集合
///
/// 聚合分配引擎所需的全部协作者，简化依赖注入，
/// 单元测试时可整体替换为内存实现。
#[derive(Clone)]
pub struct AllocationRepositories {
    pub rule_store: Arc<dyn RuleStore>,
    pub worker_registry: Arc<dyn WorkerRegistry>,
    pub work_items: Arc<dyn WorkItemSource>,
    pub audit_log: Arc<dyn AuditLog>,
}

impl AllocationRepositories {
    /// 创建新的仓储集合
    pub fn new(
        rule_store: Arc<dyn RuleStore>,
        worker_registry: Arc<dyn WorkerRegistry>,
        work_items: Arc<dyn WorkItemSource>,
        audit_log: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            rule_store,
            worker_registry,
            work_items,
            audit_log,
        }
    }
}
