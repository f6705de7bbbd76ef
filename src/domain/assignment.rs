// ==========================================
// CRM 线索分配引擎 - 分配审计与批次汇总
// ==========================================
// 红线: 每次成功提交对应且仅对应一条审计记录
// 对齐: assignment_log 表
// ==========================================

use crate::domain::types::AssignMethod;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// AssignmentRecord - 分配审计记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: String, // UUID
    pub lead_id: i64,
    pub owner_id: i64,
    pub method: AssignMethod,
    pub reason: String, // 可读的分配原因
    pub created_at: NaiveDateTime,
}

impl AssignmentRecord {
    /// 创建新的审计记录
    pub fn new(
        lead_id: i64,
        owner_id: i64,
        method: AssignMethod,
        reason: String,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            lead_id,
            owner_id,
            method,
            reason,
            created_at,
        }
    }
}

// ==========================================
// BatchSummary - 批量分配汇总
// ==========================================
// 不变式: total = assigned_by_rule + assigned_by_fallback + skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub assigned_by_rule: usize,
    pub assigned_by_fallback: usize,
    pub skipped: usize,
}

impl BatchSummary {
    /// 已分配总数
    pub fn assigned(&self) -> usize {
        self.assigned_by_rule + self.assigned_by_fallback
    }

    /// 计入一次成功分配
    ///
    /// # 返回
    /// - false: 该分配方式不由引擎产生，未计入任何分类
    pub fn record_assigned(&mut self, method: AssignMethod) -> bool {
        match method {
            AssignMethod::RuleBased => self.assigned_by_rule += 1,
            AssignMethod::RoundRobin => self.assigned_by_fallback += 1,
            AssignMethod::Manual | AssignMethod::None => return false,
        }
        true
    }
}
