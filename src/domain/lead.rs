// ==========================================
// CRM 线索分配引擎 - 线索领域模型
// ==========================================
// 红线: 已有负责人或已终结的线索不再参与分配
// 对齐: lead 表
// ==========================================

use crate::domain::types::AssignMethod;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Lead - 待分配线索 (work item)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub segment: Option<String>,           // 客户分组
    pub product_id: Option<i64>,           // 意向产品
    pub owner_id: Option<i64>,             // 负责人 (提交分配时写入)
    pub method: AssignMethod,              // 分配方式
    pub assigned_at: Option<NaiveDateTime>, // 分配时间
    pub terminal: bool,                    // 已转化/已关闭
    pub created_at: NaiveDateTime,
}

impl Lead {
    /// 是否可被引擎分配
    pub fn is_assignable(&self) -> bool {
        self.owner_id.is_none() && !self.terminal
    }
}
