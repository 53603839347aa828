// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、表格行构造
// ==========================================

#![allow(dead_code)]

use lease_inventory::config::ConfigManager;
use lease_inventory::db::{init_schema, open_sqlite_connection};
use lease_inventory::domain::{Cell, SpreadsheetData};
use lease_inventory::importer::template_headers;
use rusqlite::Connection;
use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn shared_conn(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 写入全局配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let config = ConfigManager::new(db_path)?;
    config.set_global_config_value(key, value)?;
    Ok(())
}

// ==========================================
// 表格构造
// ==========================================

pub fn template_header_strings() -> Vec<String> {
    template_headers().into_iter().map(str::to_string).collect()
}

/// 一行合法数据（模板列顺序）
pub fn valid_row(offer_code: &str) -> Vec<String> {
    [
        offer_code,
        "В продаже",
        "Toyota",
        "Camry",
        "2.5 AT",
        "Легковой",
        "2020",
        "45 000",
        "2",
        "Электронный",
        "нет",
        "нет",
        "Иванов И.И.",
        "Москва, ул. Складская, 1",
        "12",
        "1 850 000",
        "disk.yandex.ru/d/abc123",
        "Свободен",
        "EXT-1",
        "CRM-77",
        "https://example.com/offers/1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// 修改某列
pub fn with_column(mut row: Vec<String>, header: &str, value: &str) -> Vec<String> {
    let index = template_headers()
        .iter()
        .position(|h| *h == header)
        .unwrap_or_else(|| panic!("未知表头: {}", header));
    row[index] = value.to_string();
    row
}

/// 模板表头 + 指定数据行
pub fn sheet(rows: Vec<Vec<String>>) -> SpreadsheetData {
    sheet_with_headers(template_header_strings(), rows)
}

pub fn sheet_with_headers(headers: Vec<String>, rows: Vec<Vec<String>>) -> SpreadsheetData {
    SpreadsheetData::new(
        headers.into_iter().map(Cell::from).collect(),
        rows.into_iter()
            .map(|row| row.into_iter().map(Cell::from).collect())
            .collect(),
    )
}

/// 写出 CSV 临时文件（';' 分隔）
pub fn write_csv(headers: &[String], rows: &[Vec<String>]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    writeln!(file, "{}", headers.join(";"))?;
    for row in rows {
        writeln!(file, "{}", row.join(";"))?;
    }
    file.flush()?;
    Ok(file)
}
