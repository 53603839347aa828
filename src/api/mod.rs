// ==========================================
// 车辆租赁库存系统 - API 层
// ==========================================
// 职责: 面向 CLI / 调用方的业务接口，统一错误类型
// ==========================================

pub mod catalog_api;
pub mod error;
pub mod import_api;

pub use catalog_api::CatalogApi;
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportErrorListResponse, SYSTEM_ACTOR};
