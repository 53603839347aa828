// ==========================================
// 车辆租赁库存系统 - 核心库
// ==========================================
// 职责: 租赁车辆报价表格导入（台账 + 错误追溯）与目录查询
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "ru");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 操作限流
pub mod activity;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CanonicalField, ImportStatus, Role};

// 领域实体
pub use domain::{
    ActionLog, ActionType, Cell, CanonicalVehicleOfferRow, FieldValue, ImportBatch,
    ImportErrorRecord, ImportResult, ImportSummary, RowError, SpreadsheetData, VehicleOffer,
};

// 导入器
pub use importer::{ImportError, VehicleImporter, VehicleImporterImpl};

// API
pub use api::{ApiError, CatalogApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "lease-inventory";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
