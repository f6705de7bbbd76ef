// ==========================================
// CRM 线索分配引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::AllocationApi;
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::engine::{AllocationEngine, AllocationRepositories};
use crate::repository::{
    AllocationRuleRepository, AssignmentLogRepository, LeadRepository, SalespersonRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "LEAD_ALLOCATION_DB";

/// 应用状态
///
/// 包含API实例和共享仓储，所有组件共用同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 线索分配API
    pub allocation_api: Arc<AllocationApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 线索仓储（线索录入、终结）
    pub lead_repo: Arc<LeadRepository>,

    /// 销售人员仓储（在岗管理、日负载重置）
    pub salesperson_repo: Arc<SalespersonRepository>,

    /// 分配规则仓储
    pub rule_repo: Arc<AllocationRuleRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并幂等建表
    /// 2. 初始化Repository层与分配引擎
    /// 3. 创建API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库表结构初始化失败: {}", e))?;
        match read_schema_version(&conn) {
            Ok(Some(version)) if version > CURRENT_SCHEMA_VERSION => {
                return Err(format!(
                    "数据库 schema_version={} 高于程序支持的版本 {}，请升级程序",
                    version, CURRENT_SCHEMA_VERSION
                ));
            }
            Ok(version) => tracing::debug!(?version, "数据库 schema 版本检查通过"),
            Err(e) => return Err(format!("读取 schema_version 失败: {}", e)),
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let lead_repo = Arc::new(LeadRepository::new(conn.clone()));
        let salesperson_repo = Arc::new(SalespersonRepository::new(conn.clone()));
        let rule_repo = Arc::new(AllocationRuleRepository::new(conn.clone()));
        let assignment_log_repo = Arc::new(AssignmentLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let repos = AllocationRepositories::new(
            rule_repo.clone(),
            salesperson_repo.clone(),
            lead_repo.clone(),
            assignment_log_repo.clone(),
        );
        let engine = Arc::new(AllocationEngine::new(repos));

        // ==========================================
        // 初始化API层
        // ==========================================
        let allocation_api = Arc::new(AllocationApi::new(
            engine,
            config_manager.clone(),
            assignment_log_repo,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            allocation_api,
            config_manager,
            lead_repo,
            salesperson_repo,
            rule_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 LEAD_ALLOCATION_DB > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./lead_allocation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("lead-allocation");
        // best-effort: 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("lead_allocation.db");
        }
    }

    path.to_string_lossy().to_string()
}
