// ==========================================
// 车辆租赁库存系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod error;
pub mod sql_support;
pub mod vehicle_import_repo;
pub mod vehicle_import_repo_impl;
pub mod vehicle_offer_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use vehicle_import_repo::{ClearSummary, VehicleImportRepository};
pub use vehicle_import_repo_impl::VehicleImportRepositoryImpl;
pub use vehicle_offer_repo::{OfferPage, OfferQuery, VehicleOfferRepository};
