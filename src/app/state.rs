// ==========================================
// 车辆租赁库存系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CatalogApi, ImportApi};
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};

/// 覆盖默认数据库路径的环境变量
pub const DB_PATH_ENV: &str = "LEASE_INVENTORY_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 目录API
    pub catalog_api: Arc<CatalogApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开共享连接并建表（幂等）
    /// 2. 按 config_kv 初始化限流参数
    /// 3. 创建所有API实例
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;

        match read_schema_version(&conn) {
            Ok(Some(v)) if v > CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    db_version = v,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库 schema 版本高于当前程序"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "schema_version 读取失败"),
        }

        let conn = Arc::new(Mutex::new(conn));

        let import_api = ImportApi::from_connection(conn.clone())
            .await
            .map_err(|e| format!("无法创建ImportApi: {}", e))?;
        let catalog_api = CatalogApi::new(conn);

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            import_api: Arc::new(import_api),
            catalog_api: Arc::new(catalog_api),
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 LEASE_INVENTORY_DB_PATH（非空时）
/// - 否则: 用户数据目录/lease-inventory/lease_inventory.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./lease_inventory.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("lease-inventory");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("lease_inventory.db");
        }
    }

    path.to_string_lossy().to_string()
}
