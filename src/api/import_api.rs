// ==========================================
// 车辆报价导入API
// ==========================================
// 职责: 封装导入 / 批次查询 / 清空，并记录操作日志
// 说明: 导入类操作日志受 ActivityThrottle 限流；清空操作始终记录
// ==========================================

use crate::activity::{ActivityThrottle, Clock, SystemClock};
use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::import::{ImportBatch, ImportErrorRecord, ImportResult};
use crate::domain::spreadsheet::SpreadsheetData;
use crate::importer::{ImportError, UniversalFileParser, VehicleImporter, VehicleImporterImpl};
use crate::repository::{
    ActionLogRepository, ClearSummary, VehicleImportRepository, VehicleImportRepositoryImpl,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 未指定操作人时的记录值
pub const SYSTEM_ACTOR: &str = "system";

/// 批次错误分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportErrorListResponse {
    pub errors: Vec<ImportErrorRecord>,
    /// 总记录数
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

type Importer = VehicleImporterImpl<VehicleImportRepositoryImpl, ConfigManager>;

/// 导入API
pub struct ImportApi<C: Clock = SystemClock> {
    importer: Importer,
    action_log_repo: ActionLogRepository,
    throttle: ActivityThrottle<C>,
}

impl ImportApi<SystemClock> {
    /// 按 config_kv 中的限流参数创建
    pub async fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(conn.clone());
        let window = config.get_activity_window().await?;
        let max_events = config.get_activity_max_events().await?;

        Ok(Self::new(
            conn,
            ActivityThrottle::with_system_clock(window, max_events),
        ))
    }
}

impl<C: Clock> ImportApi<C> {
    pub fn new(conn: Arc<Mutex<Connection>>, throttle: ActivityThrottle<C>) -> Self {
        let importer = VehicleImporterImpl::new(
            VehicleImportRepositoryImpl::from_connection(conn.clone()),
            ConfigManager::from_connection(conn.clone()),
            Box::new(UniversalFileParser),
        );

        Self {
            importer,
            action_log_repo: ActionLogRepository::new(conn),
            throttle,
        }
    }

    fn repo(&self) -> &VehicleImportRepositoryImpl {
        self.importer.repository()
    }

    /// 导入单个文件
    ///
    /// # 参数
    /// - file_path: .xlsx / .xls / .csv 文件路径
    /// - actor: 操作人（可选）
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入结果（含 failed 批次，例如缺列）
    /// - Err(ApiError): 结构性失败，批次已置为 failed
    pub async fn import_file(&self, file_path: &str, actor: Option<&str>) -> ApiResult<ImportResult> {
        let result = self.importer.import_file(Path::new(file_path), actor).await;
        self.record_import(file_path, actor, &result);
        result.map_err(ApiError::from)
    }

    /// 导入已解码的表格（调用方自行解码时使用）
    pub async fn import_spreadsheet(
        &self,
        filename: &str,
        data: SpreadsheetData,
        actor: Option<&str>,
    ) -> ApiResult<ImportResult> {
        let result = self.importer.import_spreadsheet(filename, data, actor).await;
        self.record_import(filename, actor, &result);
        result.map_err(ApiError::from)
    }

    /// 批量导入（每个文件独立批次，互不影响）
    pub async fn import_files(
        &self,
        file_paths: Vec<String>,
        actor: Option<&str>,
    ) -> Vec<Result<ImportResult, String>> {
        let paths: Vec<PathBuf> = file_paths.iter().map(PathBuf::from).collect();
        let results = self.importer.import_files(paths, actor).await;

        for (path, result) in file_paths.iter().zip(results.iter()) {
            match result {
                Ok(r) => self.record_action(
                    ActionType::ImportVehicles,
                    actor,
                    Some(import_payload(path, r)),
                    Some(r.status.to_string()),
                ),
                Err(e) => self.record_action(
                    ActionType::ImportVehicles,
                    actor,
                    Some(json!({ "filename": path })),
                    Some(e.clone()),
                ),
            }
        }

        results
    }

    /// 最近的导入批次
    pub async fn list_batches(&self, limit: usize) -> ApiResult<Vec<ImportBatch>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.repo().list_recent_batches(limit).await?)
    }

    /// 查询单个批次
    pub async fn get_batch(&self, batch_id: &str) -> ApiResult<ImportBatch> {
        self.repo()
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("ImportBatch(id={})不存在", batch_id)))
    }

    /// 分页查询批次错误（完整台账，不受响应截断影响）
    pub async fn list_batch_errors(
        &self,
        batch_id: &str,
        limit: usize,
        offset: usize,
    ) -> ApiResult<ImportErrorListResponse> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        self.get_batch(batch_id).await?;

        let errors = self.repo().list_errors_by_batch(batch_id, limit, offset).await?;
        let total = self.repo().count_errors_by_batch(batch_id).await?;

        Ok(ImportErrorListResponse {
            errors,
            total,
            limit,
            offset,
        })
    }

    /// 清空所有导入数据（报价 / 错误 / 批次）
    ///
    /// # 参数
    /// - actor: 操作人（必填）
    pub async fn clear_import_data(&self, actor: &str) -> ApiResult<ClearSummary> {
        let actor = actor.trim();
        if actor.is_empty() {
            return Err(ApiError::InvalidInput(crate::i18n::t("api.actor_required")));
        }

        let summary = self.repo().clear_all().await?;
        info!(
            actor,
            deleted_offers = summary.deleted_offers,
            deleted_errors = summary.deleted_errors,
            deleted_batches = summary.deleted_batches,
            "导入数据已清空"
        );

        let log = ActionLog::new(
            ActionType::ClearImportData,
            actor,
            serde_json::to_value(summary).ok(),
            None,
        );
        self.action_log_repo.insert(&log)?;

        Ok(summary)
    }

    fn record_import(
        &self,
        filename: &str,
        actor: Option<&str>,
        result: &Result<ImportResult, ImportError>,
    ) {
        match result {
            Ok(r) => self.record_action(
                ActionType::ImportVehicles,
                actor,
                Some(import_payload(filename, r)),
                Some(r.status.to_string()),
            ),
            Err(e) => self.record_action(
                ActionType::ImportVehicles,
                actor,
                Some(json!({ "filename": filename })),
                Some(e.to_string()),
            ),
        }
    }

    /// 限流后写入操作日志；写入失败只记日志
    fn record_action(
        &self,
        action_type: ActionType,
        actor: Option<&str>,
        payload: Option<serde_json::Value>,
        detail: Option<String>,
    ) {
        let actor = actor.unwrap_or(SYSTEM_ACTOR);
        if !self.throttle.allow(actor) {
            info!(actor, action = action_type.as_str(), "操作日志已限流，跳过记录");
            return;
        }

        let log = ActionLog::new(action_type, actor, payload, detail);
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, "操作日志写入失败");
        }
    }
}

fn import_payload(filename: &str, result: &ImportResult) -> serde_json::Value {
    json!({
        "filename": filename,
        "importBatchId": result.import_batch_id,
        "status": result.status,
        "summary": result.summary,
        "totalErrors": result.total_errors,
        "elapsedMs": result.elapsed_time.as_millis() as u64,
    })
}
