// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use std::error::Error;

use lead_allocation::app::AppState;
use lead_allocation::db::{ensure_schema, open_sqlite_connection};
use lead_allocation::repository::NewAllocationRule;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    lead_allocation::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建完整应用状态（基于临时数据库）
pub fn create_test_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let state = AppState::new(db_path)?;
    Ok((temp_file, state))
}

/// 批量创建在岗销售人员，返回 ID 列表
pub fn seed_salespeople(state: &AppState, names: &[&str]) -> Vec<i64> {
    names
        .iter()
        .map(|name| state.salesperson_repo.create(name, None).unwrap())
        .collect()
}

/// 批量创建未分配线索，返回 ID 列表
pub fn seed_leads(state: &AppState, count: usize, segment: Option<&str>) -> Vec<i64> {
    (0..count)
        .map(|_| state.lead_repo.create(segment, None).unwrap())
        .collect()
}

/// 创建分配规则
pub fn seed_rule(
    state: &AppState,
    code: &str,
    segment: Option<&str>,
    product_ids: &[i64],
    owner_ids: &[i64],
) -> i64 {
    state
        .rule_repo
        .create(&NewAllocationRule {
            code: code.to_string(),
            segment: segment.map(str::to_string),
            product_ids: product_ids.iter().copied().collect(),
            owner_ids: owner_ids.to_vec(),
        })
        .unwrap()
}
