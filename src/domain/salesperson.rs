// ==========================================
// CRM 线索分配引擎 - 销售人员领域模型
// ==========================================
// 红线: 停用人员永远不作为候选
// 红线: 负载计数只能通过成功提交增加（日重置除外）
// 对齐: salesperson 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Salesperson - 销售人员 (worker)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salesperson {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub daily_load: i64,                        // 当日分配数
    pub total_load: i64,                        // 累计分配数
    pub last_assigned_at: Option<NaiveDateTime>, // 最近一次分配时间
    pub manual_order: Option<i64>,              // 人工排序 (越小越优先)
}

impl Salesperson {
    /// 记录一次成功分配（批次内存状态同步）
    pub fn record_assignment(&mut self, at: NaiveDateTime) {
        self.daily_load += 1;
        self.total_load += 1;
        self.last_assigned_at = Some(at);
    }
}
