// ==========================================
// CRM 线索分配引擎 - 分配规则领域模型
// ==========================================
// 约束: 批次内只读，引擎不修改规则
// 对齐: allocation_rule 表
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// AllocationRule - 分配规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRule {
    pub id: i64,
    pub code: String,                // 显示编码
    pub segment: Option<String>,     // 客户分组过滤 (None = 不限)
    pub product_ids: BTreeSet<i64>,  // 产品过滤 (空 = 不限)
    pub owner_ids: Vec<i64>,         // 候选负责人 (有序)
    pub active: bool,
}
