// ==========================================
// CRM 线索分配引擎 - 线索数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 提交分配: 线索认领（乐观检查）+ 人员计数递增 在同一事务内完成
// ==========================================

use crate::domain::{AssignMethod, Lead};
use crate::engine::repositories::WorkItemSource;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::salesperson_repo::SalespersonRepository;
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str =
    "id, segment, product_id, owner_id, assign_method, assigned_at, terminal, created_at";

// ==========================================
// LeadRepository - 线索仓储
// ==========================================
pub struct LeadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LeadRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增线索，返回ID
    pub fn create(&self, segment: Option<&str>, product_id: Option<i64>) -> RepositoryResult<i64> {
        let segment = segment.map(str::trim).filter(|s| !s.is_empty());
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO lead (segment, product_id, created_at) VALUES (?1, ?2, ?3)",
            params![segment, product_id, Utc::now().naive_utc()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 标记为终结（已转化/已关闭）
    pub fn mark_terminal(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("UPDATE lead SET terminal = 1 WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "lead".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Lead>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM lead WHERE id = ?1", SELECT_COLUMNS);
        let result = conn.query_row(&sql, params![id], Self::map_row).optional()?;
        Ok(result)
    }

    /// 查询待分配线索（未分配、未终结，最早创建优先）
    pub fn list_unassigned(&self, limit: usize) -> RepositoryResult<Vec<Lead>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM lead
            WHERE owner_id IS NULL AND terminal = 0
            ORDER BY created_at ASC, id ASC
            LIMIT ?1
            "#,
            SELECT_COLUMNS
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 提交分配（单事务）
    ///
    /// 1. 认领线索：仅当仍未分配且未终结时写入负责人
    /// 2. 递增人员计数：单条算术 UPDATE，仅对在岗人员生效
    ///
    /// 任一步失败则整个事务回滚。
    pub fn commit(
        &self,
        lead_id: i64,
        salesperson_id: i64,
        method: AssignMethod,
        assigned_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let claimed = tx.execute(
            r#"
            UPDATE lead
            SET owner_id = ?1, assign_method = ?2, assigned_at = ?3
            WHERE id = ?4 AND owner_id IS NULL AND terminal = 0
            "#,
            params![salesperson_id, method.to_db_str(), assigned_at, lead_id],
        )?;

        if claimed == 0 {
            let exists: bool = tx
                .query_row("SELECT 1 FROM lead WHERE id = ?1", params![lead_id], |_| Ok(true))
                .optional()?
                .unwrap_or(false);
            return Err(if exists {
                RepositoryError::StaleRecord {
                    entity: "lead".to_string(),
                    id: lead_id.to_string(),
                }
            } else {
                RepositoryError::NotFound {
                    entity: "lead".to_string(),
                    id: lead_id.to_string(),
                }
            });
        }

        let incremented = SalespersonRepository::increment_load(&tx, salesperson_id, assigned_at)?;
        if incremented == 0 {
            return Err(RepositoryError::DatabaseTransactionError(format!(
                "销售人员不存在或已停用: salesperson_id={}",
                salesperson_id
            )));
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    fn map_row(row: &rusqlite::Row) -> SqliteResult<Lead> {
        let method: String = row.get(4)?;
        Ok(Lead {
            id: row.get(0)?,
            segment: row.get(1)?,
            product_id: row.get(2)?,
            owner_id: row.get(3)?,
            method: AssignMethod::from_db_str(&method),
            assigned_at: row.get(5)?,
            terminal: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl WorkItemSource for LeadRepository {
    fn list_unassigned_leads(&self, limit: usize) -> RepositoryResult<Vec<Lead>> {
        self.list_unassigned(limit)
    }

    fn find_lead(&self, lead_id: i64) -> RepositoryResult<Option<Lead>> {
        self.find_by_id(lead_id)
    }

    fn commit_assignment(
        &self,
        lead_id: i64,
        salesperson_id: i64,
        method: AssignMethod,
        assigned_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        self.commit(lead_id, salesperson_id, method, assigned_at)
    }
}
