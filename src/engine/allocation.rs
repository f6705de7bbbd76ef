// ==========================================
// CRM 线索分配引擎 - 分配引擎
// ==========================================
// 流程: 规则匹配 → 候选人选择 → 兜底选择 → 提交 → 审计
// 模式: 单条模式（线索创建后触发）/ 批量模式（按需或定时触发）
// 红线: 同一时间只允许一个分配运行，避免读取过期负载导致重复压单
// 红线: 批次内每次提交后同步内存中的人员负载
// ==========================================


use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use chrono::{NaiveDateTime, Utc};

use crate::domain::{AllocationRule, AssignMethod, AssignmentRecord, BatchSummary, Lead, Salesperson};
use crate::engine::candidate::CandidateSelector;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::repositories::AllocationRepositories;
use crate::engine::rule_matcher::RuleMatcher;

/// 兜底分配原因
pub const FALLBACK_REASON: &str = "兜底分配: 当前负载最低";

/// 分配决策（尚未提交）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDecision {
    pub salesperson_id: i64,
    pub method: AssignMethod,
    pub reason: String,
}

/// AllocationEngine - 线索分配引擎
pub struct AllocationEngine {
    repos: AllocationRepositories,
    // 运行级锁：批量与单条共用同一串行化点
    run_lock: Mutex<()>,
}

impl AllocationEngine {
    pub fn new(repos: AllocationRepositories) -> Self {
        Self {
            repos,
            run_lock: Mutex::new(()),
        }
    }

    fn acquire_run_lock(&self) -> AllocationResult<MutexGuard<'_, ()>> {
        self.run_lock
            .lock()
            .map_err(|e| AllocationError::Lock(e.to_string()))
    }

    // ==========================================
    // 决策
    // ==========================================

    /// 为单条线索做出分配决策（不落库）
    ///
    /// 1. 第一条命中的规则，其候选人中在岗者按统一比较器择一（rule_based）
    /// 2. 无规则命中或候选人全部不在岗 → 全体在岗人员择一（round_robin）
    ///
    /// # 返回
    /// - `None`: 没有任何在岗人员
    pub fn decide(
        lead: &Lead,
        rules: &[AllocationRule],
        workers: &[Salesperson],
    ) -> Option<AssignmentDecision> {
        if let Some(rule_match) = RuleMatcher::find_match(lead, rules) {
            let pool = rule_match
                .rule
                .owner_ids
                .iter()
                .filter_map(|owner_id| workers.iter().find(|w| w.id == *owner_id));

            if let Some(chosen) = CandidateSelector::select(pool) {
                return Some(AssignmentDecision {
                    salesperson_id: chosen.id,
                    method: AssignMethod::RuleBased,
                    reason: rule_match.reason(),
                });
            }

            tracing::debug!(
                lead_id = lead.id,
                rule_code = %rule_match.rule.code,
                "规则候选人均不在岗，转入兜底分配"
            );
        }

        CandidateSelector::select(workers).map(|chosen| AssignmentDecision {
            salesperson_id: chosen.id,
            method: AssignMethod::RoundRobin,
            reason: FALLBACK_REASON.to_string(),
        })
    }

    // ==========================================
    // 提交
    // ==========================================

    /// 提交分配：线索认领 + 人员计数（原子）→ 审计（尽力而为）
    ///
    /// # 返回
    /// - `Ok(assigned_at)`: 分配已生效
    /// - `Err(StaleWorkItem)`: 线索已被其他流程认领，未做任何修改
    /// - `Err(Persistence)`: 写入失败，线索与人员状态均未改变
    fn commit(&self, lead: &Lead, decision: &AssignmentDecision) -> AllocationResult<NaiveDateTime> {
        let now = Utc::now().naive_utc();

        if let Err(e) = self.repos.work_items.commit_assignment(
            lead.id,
            decision.salesperson_id,
            decision.method,
            now,
        ) {
            if e.is_stale() {
                return Err(AllocationError::StaleWorkItem { lead_id: lead.id });
            }
            return Err(AllocationError::Persistence(e));
        }

        let record = AssignmentRecord::new(
            lead.id,
            decision.salesperson_id,
            decision.method,
            decision.reason.clone(),
            now,
        );
        if let Err(source) = self.repos.audit_log.append(&record) {
            let err = AllocationError::AuditWrite {
                lead_id: lead.id,
                source,
            };
            // 分配已生效，仅记录审计缺口供人工对账
            tracing::error!(
                lead_id = lead.id,
                salesperson_id = decision.salesperson_id,
                method = %decision.method,
                reason = %decision.reason,
                error = %err,
                "分配审计缺失，需人工对账"
            );
        }

        tracing::info!(
            lead_id = lead.id,
            salesperson_id = decision.salesperson_id,
            method = %decision.method,
            reason = %decision.reason,
            "线索已分配"
        );

        Ok(now)
    }

    // ==========================================
    // 单条模式
    // ==========================================

    /// 单条分配（线索创建后调用）
    ///
    /// # 返回
    /// - `Ok(true)`: 已分配
    /// - `Ok(false)`: 线索已有负责人/已终结，或提交时已被认领
    /// - `Err(NoActiveWorkers)`: 无在岗人员
    /// - `Err(LeadNotFound)` / `Err(Persistence)`: 读取或写入失败
    pub fn assign_one(&self, lead_id: i64) -> AllocationResult<bool> {
        let _guard = self.acquire_run_lock()?;

        let lead = self
            .repos
            .work_items
            .find_lead(lead_id)?
            .ok_or(AllocationError::LeadNotFound(lead_id))?;

        if !lead.is_assignable() {
            tracing::debug!(lead_id, "线索已有负责人或已终结，跳过分配");
            return Ok(false);
        }

        let workers = self.load_active_workers()?;
        if workers.is_empty() {
            return Err(AllocationError::NoActiveWorkers);
        }
        let rules = self.repos.rule_store.list_active_rules()?;

        let decision =
            Self::decide(&lead, &rules, &workers).ok_or(AllocationError::NoActiveWorkers)?;

        match self.commit(&lead, &decision) {
            Ok(_) => Ok(true),
            Err(AllocationError::StaleWorkItem { lead_id }) => {
                tracing::debug!(lead_id, "线索在提交前已被认领，跳过");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ==========================================
    // 批量模式
    // ==========================================

    /// 批量分配
    ///
    /// 一次读取线索/规则/人员快照，顺序逐条处理；
    /// 每次成功提交后更新内存中的人员负载与时间，使后续线索看到最新负载。
    ///
    /// 提交失败（非抢占）的人员移出本批候选，避免后续线索反复落到同一失效人员。
    ///
    /// # 返回
    /// - `Ok(summary)`: 单条失败只计入 skipped，不中断批次
    /// - `Err(NoActiveWorkers)`: 存在待分配线索但无在岗人员，未做任何修改
    pub fn run_batch(&self, limit: usize) -> AllocationResult<BatchSummary> {
        let _guard = self.acquire_run_lock()?;
        let started = Instant::now();

        let leads = self.repos.work_items.list_unassigned_leads(limit)?;
        if leads.is_empty() {
            tracing::debug!(limit, "无待分配线索");
            return Ok(BatchSummary::default());
        }

        let mut workers = self.load_active_workers()?;
        if workers.is_empty() {
            tracing::warn!(pending = leads.len(), "无在岗销售人员，批量分配中止");
            return Err(AllocationError::NoActiveWorkers);
        }
        let rules = self.repos.rule_store.list_active_rules()?;

        tracing::info!(
            leads = leads.len(),
            rules = rules.len(),
            workers = workers.len(),
            "开始批量分配"
        );

        let mut summary = BatchSummary {
            total: leads.len(),
            ..BatchSummary::default()
        };

        for lead in &leads {
            if !lead.is_assignable() {
                summary.skipped += 1;
                continue;
            }

            let decision = match Self::decide(lead, &rules, &workers) {
                Some(d) => d,
                None => {
                    tracing::debug!(lead_id = lead.id, "本批已无可用销售人员，跳过");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.commit(lead, &decision) {
                Ok(assigned_at) => {
                    if !summary.record_assigned(decision.method) {
                        tracing::warn!(
                            lead_id = lead.id,
                            method = %decision.method,
                            "未知分配方式，未计入批次汇总"
                        );
                    }
                    if let Some(worker) = workers
                        .iter_mut()
                        .find(|w| w.id == decision.salesperson_id)
                    {
                        worker.record_assignment(assigned_at);
                    }
                }
                Err(AllocationError::StaleWorkItem { lead_id }) => {
                    tracing::debug!(lead_id, "线索已被其他流程认领，跳过");
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(lead_id = lead.id, error = %e, "线索分配失败，已跳过");
                    summary.skipped += 1;
                    // 快照中的人员可能已停用，本批次不再选择该人员
                    workers.retain(|w| w.id != decision.salesperson_id);
                    tracing::warn!(
                        salesperson_id = decision.salesperson_id,
                        remaining = workers.len(),
                        "提交失败的销售人员已移出本批候选"
                    );
                }
            }
        }

        tracing::info!(
            total = summary.total,
            assigned_by_rule = summary.assigned_by_rule,
            assigned_by_fallback = summary.assigned_by_fallback,
            skipped = summary.skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "批量分配完成"
        );

        Ok(summary)
    }

    fn load_active_workers(&self) -> AllocationResult<Vec<Salesperson>> {
        let mut workers = self.repos.worker_registry.list_active_workers()?;
        workers.retain(|w| w.active);
        Ok(workers)
    }
}
