use super::core::AssignmentLogRepository;
use crate::domain::{AssignMethod, AssignmentRecord};
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Result as SqliteResult, Row};

impl AssignmentLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询指定线索的分配记录（最新在前）
    pub fn find_by_lead_id(&self, lead_id: i64) -> RepositoryResult<Vec<AssignmentRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, lead_id, owner_id, method, reason, created_at
            FROM assignment_log
            WHERE lead_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;

        let records = stmt
            .query_map(params![lead_id], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    /// 查询最近 N 条分配记录
    pub fn find_recent(&self, limit: usize) -> RepositoryResult<Vec<AssignmentRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, lead_id, owner_id, method, reason, created_at
            FROM assignment_log
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![limit], |row| self.map_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    /// 统计审计记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM assignment_log", [], |row| row.get(0))?;
        Ok(count)
    }

    fn map_row(&self, row: &Row) -> SqliteResult<AssignmentRecord> {
        let method: String = row.get(3)?;
        Ok(AssignmentRecord {
            id: row.get(0)?,
            lead_id: row.get(1)?,
            owner_id: row.get(2)?,
            method: AssignMethod::from_db_str(&method),
            reason: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
