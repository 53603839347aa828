// ==========================================
// 车辆租赁库存系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::import::MAX_RESPONSE_ERRORS;
use crate::importer::dq_validator::{DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

/// 限流窗口默认秒数
pub const DEFAULT_ACTIVITY_WINDOW_SECS: u64 = 60;
/// 限流窗口内默认最多次数
pub const DEFAULT_ACTIVITY_MAX_EVENTS: usize = 5;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置；缺失或非法时回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(config_key = key, raw = %raw, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_response_errors(&self) -> RepositoryResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_RESPONSE_ERRORS, MAX_RESPONSE_ERRORS)
    }

    async fn get_min_year(&self) -> RepositoryResult<i64> {
        self.get_parsed_or_default(config_keys::MIN_YEAR, DEFAULT_MIN_YEAR)
    }

    async fn get_max_year(&self) -> RepositoryResult<i64> {
        self.get_parsed_or_default(config_keys::MAX_YEAR, DEFAULT_MAX_YEAR)
    }

    async fn get_activity_window(&self) -> RepositoryResult<Duration> {
        let secs =
            self.get_parsed_or_default(config_keys::ACTIVITY_WINDOW_SECS, DEFAULT_ACTIVITY_WINDOW_SECS)?;
        Ok(Duration::from_secs(secs))
    }

    async fn get_activity_max_events(&self) -> RepositoryResult<usize> {
        self.get_parsed_or_default(config_keys::ACTIVITY_MAX_EVENTS, DEFAULT_ACTIVITY_MAX_EVENTS)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入
    pub const MAX_RESPONSE_ERRORS: &str = "import.max_response_errors";
    pub const MIN_YEAR: &str = "import.min_year";
    pub const MAX_YEAR: &str = "import.max_year";

    // 操作限流
    pub const ACTIVITY_WINDOW_SECS: &str = "activity.window_secs";
    pub const ACTIVITY_MAX_EVENTS: &str = "activity.max_events";
}
