use crate::domain::AssignmentRecord;
use crate::engine::repositories::AuditLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// AssignmentLogRepository - 分配审计仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct AssignmentLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentLogRepository {
    /// 创建新的分配审计仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入审计记录
    ///
    /// # 返回
    /// - `Ok(id)`: 成功插入,返回记录ID
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, record: &AssignmentRecord) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO assignment_log (id, lead_id, owner_id, method, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.lead_id,
                record.owner_id,
                record.method.to_db_str(),
                record.reason,
                record.created_at,
            ],
        )?;

        Ok(record.id.clone())
    }
}

impl AuditLog for AssignmentLogRepository {
    fn append(&self, record: &AssignmentRecord) -> RepositoryResult<()> {
        self.insert(record).map(|_| ())
    }
}
