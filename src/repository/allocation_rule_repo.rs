// ==========================================
// CRM 线索分配引擎 - 分配规则数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 顺序: 最新创建的规则优先（created_at DESC, id DESC），保证稳定
// 存储: product_ids / owner_ids 为 JSON 数组
// ==========================================

use crate::domain::AllocationRule;
use crate::engine::repositories::RuleStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// 新建规则参数
#[derive(Debug, Clone, Default)]
pub struct NewAllocationRule {
    pub code: String,
    pub segment: Option<String>,
    pub product_ids: BTreeSet<i64>,
    pub owner_ids: Vec<i64>,
}

// ==========================================
// AllocationRuleRepository - 分配规则仓储
// ==========================================
pub struct AllocationRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AllocationRuleRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增规则，返回ID
    ///
    /// 空白分组按“不限分组”存储
    pub fn create(&self, rule: &NewAllocationRule) -> RepositoryResult<i64> {
        if rule.code.trim().is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "code".to_string(),
                message: "规则编码不能为空".to_string(),
            });
        }

        let segment = rule
            .segment
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let product_ids = serde_json::to_string(&rule.product_ids)
            .map_err(|e| RepositoryError::Other(e.into()))?;
        let owner_ids = serde_json::to_string(&rule.owner_ids)
            .map_err(|e| RepositoryError::Other(e.into()))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO allocation_rule (code, segment, product_ids, owner_ids, created_at)
            VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%d %H:%M:%f', 'now'))
            "#,
            params![rule.code.trim(), segment, product_ids, owner_ids],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 启用/停用规则
    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE allocation_rule SET active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "allocation_rule".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询启用规则（稳定顺序）
    pub fn list_active(&self) -> RepositoryResult<Vec<AllocationRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, code, segment, product_ids, owner_ids, active
            FROM allocation_rule
            WHERE active = 1
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row) -> SqliteResult<AllocationRule> {
        let product_ids: String = row.get(3)?;
        let owner_ids: String = row.get(4)?;
        Ok(AllocationRule {
            id: row.get(0)?,
            code: row.get(1)?,
            segment: row.get(2)?,
            product_ids: parse_json_column(3, &product_ids)?,
            owner_ids: parse_json_column(4, &owner_ids)?,
            active: row.get(5)?,
        })
    }
}

fn parse_json_column<T: serde::de::DeserializeOwned>(idx: usize, raw: &str) -> SqliteResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl RuleStore for AllocationRuleRepository {
    fn list_active_rules(&self) -> RepositoryResult<Vec<AllocationRule>> {
        self.list_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> AllocationRuleRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        AllocationRuleRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn new_rule(code: &str, segment: Option<&str>, products: &[i64], owners: &[i64]) -> NewAllocationRule {
        NewAllocationRule {
            code: code.to_string(),
            segment: segment.map(str::to_string),
            product_ids: products.iter().copied().collect(),
            owner_ids: owners.to_vec(),
        }
    }

    #[test]
    fn test_round_trip_and_newest_first() {
        let repo = setup();
        let first = repo.create(&new_rule("VIP-A", Some("VIP"), &[], &[3, 1])).unwrap();
        let second = repo.create(&new_rule("P7", None, &[7, 9], &[2])).unwrap();

        let rules = repo.list_active_rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, second);
        assert_eq!(rules[1].id, first);

        assert_eq!(rules[1].segment.as_deref(), Some("VIP"));
        assert_eq!(rules[1].owner_ids, vec![3, 1]);
        assert!(rules[0].segment.is_none());
        assert!(rules[0].product_ids.contains(&9));
    }

    #[test]
    fn test_inactive_rules_hidden() {
        let repo = setup();
        let id = repo.create(&new_rule("VIP-A", Some("VIP"), &[], &[1])).unwrap();
        repo.set_active(id, false).unwrap();
        assert!(repo.list_active_rules().unwrap().is_empty());
    }

    #[test]
    fn test_blank_segment_stored_as_none() {
        let repo = setup();
        repo.create(&new_rule("ANY", Some("  "), &[5], &[1])).unwrap();
        assert!(repo.list_active_rules().unwrap()[0].segment.is_none());
    }

    #[test]
    fn test_empty_code_rejected() {
        let repo = setup();
        assert!(matches!(
            repo.create(&new_rule(" ", None, &[], &[])),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }
}
