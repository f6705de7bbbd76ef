// ==========================================
// CRM 线索分配引擎 - 候选人选择器
// ==========================================
// 排序键 (升序，先者胜出):
// 1) daily_load 少者优先
// 2) last_assigned_at 早者优先（从未分配排最前）
// 3) manual_order 小者优先（未设置排最后）
// 4) id 小者优先（确定性兜底）
// 规则路由与全局兜底共用同一比较器
// ==========================================

use crate::domain::Salesperson;
use std::cmp::Ordering;

/// CandidateSelector - 候选销售选择器（无状态）
pub struct CandidateSelector;

impl CandidateSelector {
    /// 比较两个候选人，`Ordering::Less` 表示 `a` 更优先
    pub fn compare(a: &Salesperson, b: &Salesperson) -> Ordering {
        a.daily_load
            .cmp(&b.daily_load)
            // Option 的 None < Some，恰好满足“从未分配者优先”
            .then_with(|| a.last_assigned_at.cmp(&b.last_assigned_at))
            .then_with(|| Self::compare_manual_order(a.manual_order, b.manual_order))
            .then_with(|| a.id.cmp(&b.id))
    }

    fn compare_manual_order(a: Option<i64>, b: Option<i64>) -> Ordering {
        match (a, b) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// 从候选集合中选出唯一人选，停用人员不参与
    ///
    /// # 返回
    /// - `Some(salesperson)`: 排序第一的在岗人员
    /// - `None`: 候选集合中没有在岗人员
    pub fn select<'a, I>(candidates: I) -> Option<&'a Salesperson>
    where
        I: IntoIterator<Item = &'a Salesperson>,
    {
        candidates
            .into_iter()
            .filter(|s| s.active)
            .min_by(|a, b| Self::compare(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sp(id: i64, daily_load: i64) -> Salesperson {
        Salesperson {
            id,
            name: format!("sales-{}", id),
            active: true,
            daily_load,
            total_load: daily_load,
            last_assigned_at: None,
            manual_order: None,
        }
    }

    #[test]
    fn test_lowest_load_wins() {
        let pool = vec![sp(1, 5), sp(2, 1), sp(3, 3)];
        assert_eq!(CandidateSelector::select(&pool).unwrap().id, 2);
    }

    #[test]
    fn test_never_assigned_beats_recent() {
        let mut a = sp(1, 2);
        a.last_assigned_at = Some(ts(9));
        let b = sp(2, 2);
        assert_eq!(CandidateSelector::select([&a, &b]).unwrap().id, 2);

        let mut c = sp(3, 2);
        c.last_assigned_at = Some(ts(8));
        assert_eq!(CandidateSelector::select([&a, &c]).unwrap().id, 3);
    }

    #[test]
    fn test_manual_order_null_sorts_last() {
        let a = sp(1, 0);
        let mut b = sp(2, 0);
        b.manual_order = Some(10);
        let mut c = sp(3, 0);
        c.manual_order = Some(4);
        assert_eq!(CandidateSelector::select([&a, &b, &c]).unwrap().id, 3);
        assert_eq!(CandidateSelector::select([&a, &b]).unwrap().id, 2);
    }

    #[test]
    fn test_id_is_final_tie_break() {
        let pool = vec![sp(9, 0), sp(4, 0), sp(7, 0)];
        assert_eq!(CandidateSelector::select(&pool).unwrap().id, 4);
    }

    #[test]
    fn test_inactive_never_selected() {
        let mut idle = sp(1, 0);
        idle.active = false;
        let busy = sp(2, 50);
        assert_eq!(CandidateSelector::select([&idle, &busy]).unwrap().id, 2);
        assert!(CandidateSelector::select([&idle]).is_none());
    }
}
