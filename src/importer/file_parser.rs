// ==========================================
// 车辆租赁库存系统 - 文件解析器实现
// ==========================================
// 职责: 文件 → SpreadsheetData（表头 + 数据行）
// 支持: Excel (.xlsx/.xls) / CSV (.csv，',' 或 ';' 分隔)
// 说明: 末尾全空行丢弃；中间空行保留以保证行号与表格一致
// ==========================================

use crate::domain::spreadsheet::{Cell, SpreadsheetData};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::vehicle_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;

fn ensure_exists(path: &Path) -> ImporterResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 表头 + 数据行 → SpreadsheetData
fn into_sheet(mut rows: Vec<Vec<Cell>>) -> ImporterResult<SpreadsheetData> {
    while rows.last().map_or(false, |row| row.iter().all(Cell::is_blank)) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(ImportError::EmptySpreadsheet);
    }

    let mut headers = rows.remove(0);
    // Excel 导出的 CSV 常带 BOM
    if let Some(Cell::Text(first)) = headers.first_mut() {
        *first = first.trim_start_matches('\u{feff}').to_string();
    }
    Ok(SpreadsheetData::new(headers, rows))
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按首行分隔符数量选择 ';' 或 ','
    fn sniff_delimiter(content: &[u8]) -> u8 {
        let first_line = content.split(|b| *b == b'\n').next().unwrap_or(&[]);
        let semicolons = first_line.iter().filter(|b| **b == b';').count();
        let commas = first_line.iter().filter(|b| **b == b',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }

    /// 从内存解析 CSV
    pub fn parse_bytes(&self, content: &[u8]) -> ImporterResult<SpreadsheetData> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(Self::sniff_delimiter(content))
            .from_reader(content);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(Cell::from).collect());
        }

        into_sheet(rows)
    }
}

impl FileParser for CsvParser {
    fn parse_to_sheet(&self, file_path: &Path) -> ImporterResult<SpreadsheetData> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let content = std::fs::read(file_path)?;
        self.parse_bytes(&content)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn to_cell(data: &Data) -> Cell {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::from(s.as_str()),
            Data::Int(i) => Cell::from(*i),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::from(other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_to_sheet(&self, file_path: &Path) -> ImporterResult<SpreadsheetData> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(Self::to_cell).collect())
            .collect();

        into_sheet(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_sheet(&self, file_path: &Path) -> ImporterResult<SpreadsheetData> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_to_sheet(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_sheet(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
