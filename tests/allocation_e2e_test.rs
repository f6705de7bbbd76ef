// ==========================================
// 线索分配端到端测试
// ==========================================
// 场景:
// 1. 规则路由 + 兜底分配混合批次
// 2. 负载均衡与日切重置
// 3. 并发批次不重复分配
// 4. 定时批量分配任务的启停
// ==========================================

mod test_helpers;

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lead_allocation::app::batch_job;
use lead_allocation::domain::AssignMethod;
use lead_allocation::engine::FALLBACK_REASON;
use test_helpers::*;
use tokio_util::sync::CancellationToken;

fn loads_by_id(state: &lead_allocation::app::AppState) -> HashMap<i64, i64> {
    state
        .salesperson_repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|w| (w.id, w.daily_load))
        .collect()
}

// ==========================================
// 规则路由 + 兜底
// ==========================================

#[test]
fn test_batch_routes_by_rule_then_falls_back() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let ids = seed_salespeople(&state, &["甲", "乙", "丙"]);
    let (a, b, c) = (ids[0], ids[1], ids[2]);
    seed_rule(&state, "ENT", Some("enterprise"), &[], &[a, b]);

    let enterprise = seed_leads(&state, 4, Some("enterprise"));
    let smb = seed_leads(&state, 2, Some("smb"));

    let summary = state.allocation_api.run_batch(None).unwrap();
    assert_eq!(summary.total, 6);
    assert_eq!(summary.assigned_by_rule, 4);
    assert_eq!(summary.assigned_by_fallback, 2);
    assert_eq!(summary.skipped, 0);

    for id in &enterprise {
        let lead = state.lead_repo.find_by_id(*id).unwrap().unwrap();
        assert_eq!(lead.method, AssignMethod::RuleBased);
        assert!([a, b].contains(&lead.owner_id.unwrap()));

        let records = state.allocation_api.list_lead_assignments(*id).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].reason.contains("ENT"));
    }

    // 规则命中后甲乙各2，兜底的两条都落在丙
    for id in &smb {
        let lead = state.lead_repo.find_by_id(*id).unwrap().unwrap();
        assert_eq!(lead.method, AssignMethod::RoundRobin);
        assert_eq!(lead.owner_id, Some(c));

        let records = state.allocation_api.list_lead_assignments(*id).unwrap();
        assert_eq!(records[0].reason, FALLBACK_REASON);
    }

    let loads = loads_by_id(&state);
    assert_eq!(loads[&a], 2);
    assert_eq!(loads[&b], 2);
    assert_eq!(loads[&c], 2);
}

#[test]
fn test_rule_with_inactive_owner_uses_remaining_owner() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let ids = seed_salespeople(&state, &["甲", "乙", "丙"]);
    seed_rule(&state, "P100", None, &[100], &[ids[0], ids[1]]);
    state.salesperson_repo.set_active(ids[0], false).unwrap();

    let lead = state.lead_repo.create(None, Some(100)).unwrap();
    assert!(state.allocation_api.assign_lead(lead).unwrap());

    let stored = state.lead_repo.find_by_id(lead).unwrap().unwrap();
    assert_eq!(stored.owner_id, Some(ids[1]));
    assert_eq!(stored.method, AssignMethod::RuleBased);
}

#[test]
fn test_disabled_rule_is_ignored() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let ids = seed_salespeople(&state, &["甲", "乙"]);
    let rule = seed_rule(&state, "ENT", Some("enterprise"), &[], &[ids[1]]);
    state.rule_repo.set_active(rule, false).unwrap();

    let lead = seed_leads(&state, 1, Some("enterprise"))[0];
    assert!(state.allocation_api.assign_lead(lead).unwrap());

    let stored = state.lead_repo.find_by_id(lead).unwrap().unwrap();
    assert_eq!(stored.method, AssignMethod::RoundRobin);
    assert_eq!(stored.owner_id, Some(ids[0]));
}

// ==========================================
// 负载均衡与日切
// ==========================================

#[test]
fn test_batch_spreads_load_and_reset_daily() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let ids = seed_salespeople(&state, &["甲", "乙", "丙"]);
    seed_leads(&state, 9, None);

    let summary = state.allocation_api.run_batch(None).unwrap();
    assert_eq!(summary.assigned_by_fallback, 9);

    let loads = loads_by_id(&state);
    for id in &ids {
        assert_eq!(loads[id], 3);
    }

    let reset = state.salesperson_repo.reset_daily_loads().unwrap();
    assert_eq!(reset, 3);
    for worker in state.salesperson_repo.list_all().unwrap() {
        assert_eq!(worker.daily_load, 0);
        assert_eq!(worker.total_load, 3);
        assert!(worker.last_assigned_at.is_some());
    }
}

#[test]
fn test_batch_skips_terminal_and_owned_leads() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_salespeople(&state, &["甲"]);
    let leads = seed_leads(&state, 3, None);
    state.lead_repo.mark_terminal(leads[0]).unwrap();
    assert!(state.allocation_api.assign_lead(leads[1]).unwrap());

    let summary = state.allocation_api.run_batch(None).unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.assigned(), 1);

    assert!(state.lead_repo.find_by_id(leads[0]).unwrap().unwrap().owner_id.is_none());

    // 再跑一次无事可做
    let summary = state.allocation_api.run_batch(None).unwrap();
    assert_eq!(summary.total, 0);
}

// ==========================================
// 并发
// ==========================================

#[test]
fn test_concurrent_batches_assign_each_lead_once() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_salespeople(&state, &["甲", "乙", "丙", "丁"]);
    let leads = seed_leads(&state, 40, None);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let api = Arc::clone(&state.allocation_api);
            thread::spawn(move || api.run_batch(Some(15)).unwrap())
        })
        .collect();

    let assigned: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap().assigned())
        .sum();
    assert_eq!(assigned, 40);

    for id in &leads {
        assert_eq!(state.allocation_api.list_lead_assignments(*id).unwrap().len(), 1);
    }

    let total_load: i64 = loads_by_id(&state).values().sum();
    assert_eq!(total_load, 40);
    for load in loads_by_id(&state).values() {
        assert_eq!(*load, 10);
    }
}

// ==========================================
// 定时任务
// ==========================================

#[tokio::test]
async fn test_batch_job_assigns_until_cancelled() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    seed_salespeople(&state, &["甲", "乙"]);
    let leads = seed_leads(&state, 5, None);

    let cancel = CancellationToken::new();
    let job = tokio::spawn(batch_job::run(
        Arc::clone(&state.allocation_api),
        Duration::from_millis(20),
        cancel.clone(),
    ));

    // 首个 tick 立即触发
    let mut done = false;
    for _ in 0..100 {
        let pending = leads
            .iter()
            .filter(|id| state.lead_repo.find_by_id(**id).unwrap().unwrap().owner_id.is_none())
            .count();
        if pending == 0 {
            done = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(done, "定时任务未完成分配");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), job)
        .await
        .expect("定时任务未在取消后退出")
        .unwrap();
}

#[tokio::test]
async fn test_batch_job_survives_missing_workers() {
    let (_tmp, state) = create_test_state().expect("无法创建测试环境");
    let lead = seed_leads(&state, 1, None)[0];

    let cancel = CancellationToken::new();
    let job = tokio::spawn(batch_job::run(
        Arc::clone(&state.allocation_api),
        Duration::from_millis(20),
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!job.is_finished());

    // 人员上岗后下一轮补分配
    seed_salespeople(&state, &["甲"]);
    let mut assigned = false;
    for _ in 0..100 {
        if state.lead_repo.find_by_id(lead).unwrap().unwrap().owner_id.is_some() {
            assigned = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(assigned);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), job)
        .await
        .expect("定时任务未在取消后退出")
        .unwrap();
}
