// ==========================================
// CRM 线索分配引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::allocation_config_trait::{AllocationConfig, AllocationConfigReader, ConfigResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置，缺失或格式错误时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Debug,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = ?default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    fn get_bool_or_default(&self, key: &str, default: bool) -> ConfigResult<bool> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };
        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Ok(true),
            "0" | "false" | "no" | "n" | "off" => Ok(false),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, default, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 同步读取完整分配配置（供同步 API 层使用）
    pub fn load_allocation_config(&self) -> ConfigResult<AllocationConfig> {
        let defaults = AllocationConfig::default();
        Ok(AllocationConfig {
            auto_assign_enabled: self
                .get_bool_or_default(config_keys::AUTO_ASSIGN_ENABLED, defaults.auto_assign_enabled)?,
            default_batch_limit: self
                .get_parsed_or_default(config_keys::DEFAULT_BATCH_LIMIT, defaults.default_batch_limit)?,
            max_batch_limit: self
                .get_parsed_or_default(config_keys::MAX_BATCH_LIMIT, defaults.max_batch_limit)?,
            batch_interval_secs: self
                .get_parsed_or_default(config_keys::BATCH_INTERVAL_SECS, defaults.batch_interval_secs)?,
        })
    }
}

// ==========================================
// AllocationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AllocationConfigReader for ConfigManager {
    async fn get_allocation_config(&self) -> ConfigResult<AllocationConfig> {
        self.load_allocation_config()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 自动分配
    pub const AUTO_ASSIGN_ENABLED: &str = "allocation.auto_assign_enabled";

    // 批量分配
    pub const DEFAULT_BATCH_LIMIT: &str = "allocation.default_batch_limit";
    pub const MAX_BATCH_LIMIT: &str = "allocation.max_batch_limit";
    pub const BATCH_INTERVAL_SECS: &str = "allocation.batch_interval_secs";
}
