// ==========================================
// CRM 线索分配引擎 - 规则匹配器
// ==========================================
// 规则: 分组与产品均不冲突，且至少一个维度为正向命中
// 顺序: 按规则存储返回顺序，先命中者生效
// ==========================================

use crate::domain::{AllocationRule, Lead};

/// 命中维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDimension {
    Segment,
    Product,
    SegmentAndProduct,
}

impl MatchDimension {
    pub fn label(&self) -> &'static str {
        match self {
            MatchDimension::Segment => "客户分组",
            MatchDimension::Product => "意向产品",
            MatchDimension::SegmentAndProduct => "客户分组+意向产品",
        }
    }
}

/// 规则匹配结果
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a AllocationRule,
    pub dimension: MatchDimension,
}

impl RuleMatch<'_> {
    /// 生成审计用分配原因
    pub fn reason(&self) -> String {
        format!("规则 {} 命中: {}", self.rule.code, self.dimension.label())
    }
}

/// RuleMatcher - 分配规则匹配器
pub struct RuleMatcher;

impl RuleMatcher {
    /// 检查单条规则是否命中线索
    ///
    /// # 返回
    /// - `Some(dimension)`: 命中，附带正向命中的维度
    /// - `None`: 存在冲突，或双方均无约束（不冲突不等于命中）
    pub fn check(rule: &AllocationRule, lead: &Lead) -> Option<MatchDimension> {
        let segment_hit = match (rule.segment.as_deref(), lead.segment.as_deref()) {
            (Some(rule_segment), Some(lead_segment)) => {
                if rule_segment != lead_segment {
                    // 双方都指定且不同：硬冲突
                    return None;
                }
                true
            }
            _ => false,
        };

        let product_hit = match lead.product_id {
            Some(product_id) if !rule.product_ids.is_empty() => {
                if !rule.product_ids.contains(&product_id) {
                    return None;
                }
                true
            }
            _ => false,
        };

        match (segment_hit, product_hit) {
            (true, true) => Some(MatchDimension::SegmentAndProduct),
            (true, false) => Some(MatchDimension::Segment),
            (false, true) => Some(MatchDimension::Product),
            (false, false) => None,
        }
    }

    /// 在规则列表中查找第一条命中的启用规则
    pub fn find_match<'a>(lead: &Lead, rules: &'a [AllocationRule]) -> Option<RuleMatch<'a>> {
        rules
            .iter()
            .filter(|rule| rule.active)
            .find_map(|rule| {
                Self::check(rule, lead).map(|dimension| RuleMatch { rule, dimension })
            })
    }
}
