// ==========================================
// 车辆租赁库存系统 - 导入批次领域模型
// ==========================================
// 职责: 导入批次 / 导入错误 / 导入结果
// 对齐: import_batches / import_errors 表
// ==========================================

use crate::domain::types::{CanonicalField, ImportStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 响应中最多返回的错误条数（落库不受此限制）
pub const MAX_RESPONSE_ERRORS: usize = 100;

/// 表头所在行号（数据行从 2 开始）
pub const HEADER_ROW_NUMBER: usize = 1;

/// 整文件失败使用的行号
pub const WHOLE_FILE_ROW_NUMBER: usize = 0;

// ==========================================
// ImportBatch - 导入批次
// ==========================================
// 生命周期: 创建(failed, 计数 0) → 结束时更新一次为终态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub id: String,
    pub filename: String,
    pub status: ImportStatus,
    pub total_rows: usize,
    pub imported_rows: usize,
    pub skipped_rows: usize,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

// ==========================================
// ImportErrorRecord - 已落库的导入错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportErrorRecord {
    pub id: i64,
    pub import_batch_id: String,
    pub row_number: usize,
    pub field: Option<CanonicalField>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// RowError - 行级错误（响应载荷）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row_number: usize,
    pub field: Option<CanonicalField>,
    pub message: String,
}

// ==========================================
// ImportSummary - 批次计数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported_rows: usize,
    pub skipped_rows: usize,
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub import_batch_id: String,
    pub status: ImportStatus,
    pub summary: ImportSummary,
    /// 截断至 MAX_RESPONSE_ERRORS
    pub errors: Vec<RowError>,
    /// 错误总数（未截断）
    pub total_errors: usize,
    #[serde(skip)]
    pub elapsed_time: Duration,
}

// ==========================================
// ErrorCollector - 响应错误收集（带上限）
// ==========================================
#[derive(Debug, Clone)]
pub struct ErrorCollector {
    limit: usize,
    errors: Vec<RowError>,
    total: usize,
}

impl ErrorCollector {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            errors: Vec::new(),
            total: 0,
        }
    }

    /// 记录一条错误，超出上限只计数
    pub fn push(&mut self, error: RowError) {
        self.total += 1;
        if self.errors.len() < self.limit {
            self.errors.push(error);
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn into_errors(self) -> Vec<RowError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_collector_caps_but_counts() {
        let mut collector = ErrorCollector::new(2);
        for row in 0..5 {
            collector.push(RowError {
                row_number: row + 2,
                field: Some(CanonicalField::Price),
                message: "x".to_string(),
            });
        }
        assert_eq!(collector.total(), 5);
        let errors = collector.into_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row_number, 2);
    }

    #[test]
    fn test_import_result_serializes_camel_case() {
        let result = ImportResult {
            import_batch_id: "b1".to_string(),
            status: ImportStatus::CompletedWithErrors,
            summary: ImportSummary {
                total_rows: 2,
                imported_rows: 1,
                skipped_rows: 1,
            },
            errors: vec![RowError {
                row_number: 3,
                field: Some(CanonicalField::Year),
                message: "bad".to_string(),
            }],
            total_errors: 1,
            elapsed_time: Duration::from_millis(5),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["importBatchId"], "b1");
        assert_eq!(json["status"], "completed_with_errors");
        assert_eq!(json["summary"]["skippedRows"], 1);
        assert_eq!(json["errors"][0]["field"], "year");
        assert!(json.get("elapsedTime").is_none());
    }
}
