// ==========================================
// CRM 线索分配引擎 - 领域类型定义
// ==========================================
// 职责: 分配方式等跨实体共享的枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 分配方式 (Assign Method)
// ==========================================
// 序列化格式: snake_case (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignMethod {
    None,       // 未分配
    RuleBased,  // 规则路由
    RoundRobin, // 负载均衡兜底
    Manual,     // 人工指派
}

impl AssignMethod {
    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssignMethod::None => "none",
            AssignMethod::RuleBased => "rule_based",
            AssignMethod::RoundRobin => "round_robin",
            AssignMethod::Manual => "manual",
        }
    }

    /// 从数据库字符串解析（未知值按未分配处理）
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "rule_based" => AssignMethod::RuleBased,
            "round_robin" => AssignMethod::RoundRobin,
            "manual" => AssignMethod::Manual,
            _ => AssignMethod::None,
        }
    }
}

impl fmt::Display for AssignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Default for AssignMethod {
    fn default() -> Self {
        AssignMethod::None
    }
}
