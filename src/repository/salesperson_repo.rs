// ==========================================
// CRM 线索分配引擎 - 销售人员数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 负载计数只用单条算术 UPDATE 递增，禁止读改写
// ==========================================

use crate::domain::Salesperson;
use crate::engine::repositories::WorkerRegistry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str =
    "id, name, active, daily_load, total_load, last_assigned_at, manual_order";

// ==========================================
// SalespersonRepository - 销售人员仓储
// ==========================================
pub struct SalespersonRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SalespersonRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增销售人员，返回ID
    pub fn create(&self, name: &str, manual_order: Option<i64>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO salesperson (name, manual_order) VALUES (?1, ?2)",
            params![name, manual_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 启用/停用
    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE salesperson SET active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "salesperson".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Salesperson>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM salesperson WHERE id = ?1", SELECT_COLUMNS);
        let result = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(result)
    }

    /// 查询全部人员（含停用）
    pub fn list_all(&self) -> RepositoryResult<Vec<Salesperson>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM salesperson ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 查询在岗人员
    pub fn list_active(&self) -> RepositoryResult<Vec<Salesperson>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM salesperson WHERE active = 1 ORDER BY id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 重置当日负载（外部日切任务调用）
    ///
    /// # 返回
    /// - 被重置的行数
    pub fn reset_daily_loads(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("UPDATE salesperson SET daily_load = 0 WHERE daily_load <> 0", [])?;
        Ok(rows)
    }

    /// 原子递增负载计数（供分配提交事务内使用）
    ///
    /// 仅对在岗人员生效；返回受影响行数（0 表示人员不存在或已停用）
    pub(crate) fn increment_load(
        conn: &Connection,
        id: i64,
        assigned_at: NaiveDateTime,
    ) -> SqliteResult<usize> {
        conn.execute(
            r#"
            UPDATE salesperson
            SET daily_load = daily_load + 1,
                total_load = total_load + 1,
                last_assigned_at = ?1
            WHERE id = ?2 AND active = 1
            "#,
            params![assigned_at, id],
        )
    }

    fn map_row(row: &rusqlite::Row) -> SqliteResult<Salesperson> {
        Ok(Salesperson {
            id: row.get(0)?,
            name: row.get(1)?,
            active: row.get(2)?,
            daily_load: row.get(3)?,
            total_load: row.get(4)?,
            last_assigned_at: row.get(5)?,
            manual_order: row.get(6)?,
        })
    }
}

impl WorkerRegistry for SalespersonRepository {
    fn list_active_workers(&self) -> RepositoryResult<Vec<Salesperson>> {
        self.list_active()
    }
}
