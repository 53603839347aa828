// ==========================================
// 车辆租赁库存系统 - 导入层
// ==========================================
// 职责: 表格 → 规范行 → 校验 → 落库
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod header_resolver;
pub mod vehicle_importer_impl;
pub mod vehicle_importer_trait;

// 重导出核心类型
pub use dq_validator::{DqValidator, FieldViolation};
pub use error::{ImportError, ImporterResult};
pub use field_mapper::{normalize_row, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use header_resolver::{normalize_header, resolve_column_map, template_headers, ColumnMap};
pub use vehicle_importer_impl::VehicleImporterImpl;

// 重导出 Trait 接口
pub use vehicle_importer_trait::{FileParser, RowValidator, VehicleImporter};
