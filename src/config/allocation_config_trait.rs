// ==========================================
// CRM 线索分配引擎 - 分配配置读取 Trait
// ==========================================
// 职责: 定义分配模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// 分配配置快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// 线索创建后是否自动分配
    pub auto_assign_enabled: bool,
    /// 批量分配默认条数
    pub default_batch_limit: usize,
    /// 批量分配条数上限
    pub max_batch_limit: usize,
    /// 定时批量分配间隔（秒），0 表示不启用
    pub batch_interval_secs: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            auto_assign_enabled: true,
            default_batch_limit: 200,
            max_batch_limit: 1000,
            batch_interval_secs: 0,
        }
    }
}

impl AllocationConfig {
    /// 解析请求条数：缺省取默认值，超过上限截断
    ///
    /// # 返回
    /// - `None`: 请求条数为 0
    pub fn resolve_limit(&self, requested: Option<usize>) -> Option<usize> {
        let limit = requested.unwrap_or(self.default_batch_limit);
        if limit == 0 {
            return None;
        }
        Some(limit.min(self.max_batch_limit.max(1)))
    }
}

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
// 使用者: 异步上下文（serve 模式启动定时任务）
#[async_trait]
pub trait AllocationConfigReader: Send + Sync {
    /// 读取完整分配配置，缺失或格式错误的键取默认值
    async fn get_allocation_config(&self) -> ConfigResult<AllocationConfig>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_limit() {
        let config = AllocationConfig::default();
        assert_eq!(config.resolve_limit(None), Some(200));
        assert_eq!(config.resolve_limit(Some(50)), Some(50));
        assert_eq!(config.resolve_limit(Some(5000)), Some(1000));
        assert_eq!(config.resolve_limit(Some(0)), None);
    }
}
