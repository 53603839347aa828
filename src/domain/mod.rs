// ==========================================
// 车辆租赁库存系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod action_log;
pub mod import;
pub mod spreadsheet;
pub mod types;
pub mod vehicle;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use import::{
    ErrorCollector, ImportBatch, ImportErrorRecord, ImportResult, ImportSummary, RowError,
    MAX_RESPONSE_ERRORS,
};
pub use spreadsheet::{Cell, SpreadsheetData};
pub use types::{CanonicalField, ImportStatus, Role};
pub use vehicle::{
    CanonicalVehicleOfferRow, FieldValue, NewVehicleOffer, Restricted, VehicleOffer,
};
