// ==========================================
// 车辆租赁库存系统 - 导入台账 Repository Trait
// ==========================================
// 职责: 导入批次 / 导入错误 / 车辆报价 的数据访问接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::import::{ImportBatch, ImportErrorRecord, ImportSummary};
use crate::domain::types::{CanonicalField, ImportStatus};
use crate::domain::vehicle::CanonicalVehicleOfferRow;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 清空结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearSummary {
    pub deleted_offers: usize,
    pub deleted_errors: usize,
    pub deleted_batches: usize,
}

// ==========================================
// VehicleImportRepository Trait
// ==========================================
// 实现者: VehicleImportRepositoryImpl（使用 rusqlite）
// 约定: 调用方不重试，失败即返回错误
#[async_trait]
pub trait VehicleImportRepository: Send + Sync {
    // ===== 批次管理 =====

    /// 创建导入批次（计数为 0）
    async fn create_batch(
        &self,
        id: &str,
        filename: &str,
        status: ImportStatus,
        created_by: Option<&str>,
    ) -> RepositoryResult<()>;

    /// 更新批次终态与计数
    async fn update_batch_summary(
        &self,
        id: &str,
        status: ImportStatus,
        summary: ImportSummary,
    ) -> RepositoryResult<()>;

    /// 查询单个批次
    async fn get_batch(&self, id: &str) -> RepositoryResult<Option<ImportBatch>>;

    /// 查询最近的导入批次（按创建时间倒序）
    async fn list_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>>;

    // ===== 错误台账 =====

    /// 写入一条导入错误
    ///
    /// # 参数
    /// - row_number: 1 = 表头，2 起为数据行，0 = 整文件失败
    /// - field: 规范字段；整行 / 整文件失败为 None
    async fn insert_error(
        &self,
        batch_id: &str,
        row_number: usize,
        field: Option<CanonicalField>,
        message: &str,
    ) -> RepositoryResult<()>;

    /// 分页查询批次错误（按行号、字段写入顺序）
    async fn list_errors_by_batch(
        &self,
        batch_id: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Vec<ImportErrorRecord>>;

    /// 统计批次错误数
    async fn count_errors_by_batch(&self, batch_id: &str) -> RepositoryResult<usize>;

    // ===== 车辆报价 =====

    /// 写入一条车辆报价（单行事务）
    ///
    /// # 返回
    /// - Ok(id): 新记录 ID
    /// - Err(FieldValueError): 行中存在未确定的必填字段
    async fn insert_offer(
        &self,
        batch_id: &str,
        row: &CanonicalVehicleOfferRow,
    ) -> RepositoryResult<i64>;

    /// 统计批次已落库报价数
    async fn count_offers_by_batch(&self, batch_id: &str) -> RepositoryResult<usize>;

    // ===== 管理操作 =====

    /// 清空 报价 / 错误 / 批次（单事务）
    async fn clear_all(&self) -> RepositoryResult<ClearSummary>;
}
