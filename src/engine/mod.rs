// ==========================================
// CRM 线索分配引擎 - 引擎层
// ==========================================
// 职责: 规则匹配、候选人选择、分配编排
// 红线: Engine 不拼 SQL, 所有分配必须输出 reason
// ==========================================

pub mod allocation;
pub mod candidate;
pub mod error;
pub mod repositories;
pub mod rule_matcher;

// 重导出核心引擎
pub use allocation::{AllocationEngine, AssignmentDecision, FALLBACK_REASON};
pub use candidate::CandidateSelector;
pub use error::{AllocationError, AllocationResult};
pub use repositories::{AllocationRepositories, AuditLog, RuleStore, WorkItemSource, WorkerRegistry};
pub use rule_matcher::{MatchDimension, RuleMatch, RuleMatcher};
