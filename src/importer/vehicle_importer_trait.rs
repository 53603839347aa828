// ==========================================
// 车辆租赁库存系统 - 车辆导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::import::ImportResult;
use crate::domain::spreadsheet::SpreadsheetData;
use crate::domain::vehicle::CanonicalVehicleOfferRow;
use crate::importer::dq_validator::FieldViolation;
use crate::importer::error::ImporterResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// ==========================================
// VehicleImporter Trait
// ==========================================
// 用途: 车辆报价导入主接口
// 实现者: VehicleImporterImpl
#[async_trait]
pub trait VehicleImporter: Send + Sync {
    /// 从文件导入（.xlsx / .xls / .csv）
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - actor: 调用方身份（仅记录日志）
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入结果（含批次 ID、汇总、截断后的错误列表）
    /// - Err: 结构性失败（文件不可解码 / 存储不可用），批次已置为 failed
    async fn import_file(
        &self,
        file_path: &Path,
        actor: Option<&str>,
    ) -> ImporterResult<ImportResult>;

    /// 导入已解码的表格
    async fn import_spreadsheet(
        &self,
        filename: &str,
        data: SpreadsheetData,
        actor: Option<&str>,
    ) -> ImporterResult<ImportResult>;

    /// 批量导入多个文件（每个文件独立批次）
    ///
    /// # 说明
    /// - 某个文件失败不影响其他文件
    /// - 返回顺序与输入顺序一致
    async fn import_files(
        &self,
        file_paths: Vec<PathBuf>,
        actor: Option<&str>,
    ) -> Vec<Result<ImportResult, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解码（表头 + 数据行）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表格数据
    ///
    /// # 返回
    /// - Ok(SpreadsheetData): 第一行为表头，其余为数据行
    /// - Err: 文件不存在 / 格式不支持 / 解析失败
    fn parse_to_sheet(&self, file_path: &Path) -> ImporterResult<SpreadsheetData>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 行校验
// 实现者: DqValidator
pub trait RowValidator: Send + Sync {
    /// 校验规范行，返回全部违规（空 = 可落库）
    fn validate_row(&self, row: &CanonicalVehicleOfferRow) -> Vec<FieldViolation>;
}
