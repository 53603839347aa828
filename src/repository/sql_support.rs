// ==========================================
// 车辆租赁库存系统 - SQL 构建工具模块
// ==========================================
// 职责: 时间戳读写 + 动态 WHERE 子句构建
// 约束: 所有用户输入只通过参数绑定进入 SQL
// ==========================================

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{ToSql, Type};

/// 写入用时间戳（RFC3339，UTC，定长微秒，保证文本序 = 时间序）
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 读取 RFC3339 时间戳
///
/// # 参数
/// - `idx`: 列序号（用于错误定位）
/// - `raw`: 列文本
pub fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 可选时间戳列
pub fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

/// 转义 LIKE 通配符（配合 `ESCAPE '\'` 使用）
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ==========================================
// WhereBuilder - 动态过滤条件
// ==========================================
// 用法:
// ```ignore
// let mut w = WhereBuilder::new();
// w.push("brand = ?", brand.to_string());
// let sql = format!("SELECT ... FROM t{} ORDER BY id", w.clause());
// stmt.query_map(w.params().as_slice(), ...)
// ```
#[derive(Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    values: Vec<Box<dyn ToSql>>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个单参数条件
    pub fn push<V: ToSql + 'static>(&mut self, condition: &str, value: V) {
        self.conditions.push(condition.to_string());
        self.values.push(Box::new(value));
    }

    /// 追加一个多参数条件（占位符数量须与 values 一致）
    pub fn push_many(&mut self, condition: &str, values: Vec<Box<dyn ToSql>>) {
        self.conditions.push(condition.to_string());
        self.values.extend(values);
    }

    /// " WHERE a AND b"；无条件时为空串
    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.values.iter().map(|v| v.as_ref()).collect()
    }
}
