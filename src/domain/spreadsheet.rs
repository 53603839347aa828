// ==========================================
// 车辆租赁库存系统 - 表格数据模型
// ==========================================
// 职责: 解码后的表格（表头 + 数据行）
// 约束: 单元格为松散类型（文本/数字/布尔/空）
// ==========================================

use serde::{Deserialize, Serialize};

/// 单元格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// 转为文本（整数值浮点不带 ".0"）
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

// ==========================================
// SpreadsheetData - 解码结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpreadsheetData {
    pub headers: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl SpreadsheetData {
    pub fn new(headers: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_to_text_drops_integral_fraction() {
        assert_eq!(Cell::Number(2020.0).to_text(), "2020");
        assert_eq!(Cell::Number(-5.0).to_text(), "-5");
        assert_eq!(Cell::Number(1234.56).to_text(), "1234.56");
    }

    #[test]
    fn test_blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text("   ".to_string()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
        assert!(!Cell::from("x").is_blank());
    }

    #[test]
    fn test_from_empty_str_is_empty_cell() {
        assert_eq!(Cell::from(""), Cell::Empty);
        assert_eq!(Cell::from(true).to_text(), "true");
    }
}
