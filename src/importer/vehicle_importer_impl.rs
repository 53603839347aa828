// ==========================================
// 车辆租赁库存系统 - 车辆报价导入器实现
// ==========================================
// 职责: 整合导入流程，从表格到数据库
// 流程: 建批次 → 解码 → 表头解析 → 逐行 规范化 / 校验 / 落库 → 结束批次
// 红线: 批次创建后，任何路径都必须把批次更新为终态
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{
    ErrorCollector, ImportResult, ImportSummary, RowError, HEADER_ROW_NUMBER,
    MAX_RESPONSE_ERRORS, WHOLE_FILE_ROW_NUMBER,
};
use crate::domain::spreadsheet::SpreadsheetData;
use crate::domain::types::{CanonicalField, ImportStatus};
use crate::i18n::t_with_args;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::field_mapper::normalize_row;
use crate::importer::header_resolver::{resolve_column_map, template_header};
use crate::importer::vehicle_importer_trait::{FileParser, RowValidator, VehicleImporter};
use crate::repository::error::RepositoryError;
use crate::repository::VehicleImportRepository;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn, Span};
use uuid::Uuid;

/// 数据行行号 = 下标 + 2（表头为第 1 行）
fn data_row_number(index: usize) -> usize {
    index + HEADER_ROW_NUMBER + 1
}

fn config_error(key: &'static str) -> impl FnOnce(RepositoryError) -> ImportError {
    move |e| ImportError::ConfigReadError {
        key: key.to_string(),
        message: e.to_string(),
    }
}

// 处理阶段的产出（终态 + 响应错误）
struct Processed {
    status: ImportStatus,
    errors: ErrorCollector,
}

// ==========================================
// VehicleImporterImpl - 车辆报价导入器实现
// ==========================================
pub struct VehicleImporterImpl<R, C>
where
    R: VehicleImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    // 为 None 时按配置的年份范围构造 DqValidator
    row_validator: Option<Box<dyn RowValidator>>,
}

impl<R, C> VehicleImporterImpl<R, C>
where
    R: VehicleImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的 VehicleImporter 实例
    ///
    /// # 参数
    /// - import_repo: 导入台账仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    pub fn new(import_repo: R, config: C, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            import_repo,
            config,
            file_parser,
            row_validator: None,
        }
    }

    /// 替换行校验器
    pub fn with_validator(mut self, validator: Box<dyn RowValidator>) -> Self {
        self.row_validator = Some(validator);
        self
    }

    pub fn repository(&self) -> &R {
        &self.import_repo
    }

    /// 导入主流程
    ///
    /// # 说明
    /// - decode 在批次创建之后执行，解码失败同样走失败收尾
    /// - 失败收尾: 写入 row 0 错误 → 批次置 failed（计数为已累计值）→ 返回原错误
    #[instrument(skip(self, decode), fields(batch_id = tracing::field::Empty))]
    async fn run_import<F>(
        &self,
        filename: &str,
        actor: Option<&str>,
        decode: F,
    ) -> ImporterResult<ImportResult>
    where
        F: FnOnce() -> ImporterResult<SpreadsheetData> + Send,
    {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        Span::current().record("batch_id", batch_id.as_str());

        info!(filename, actor = actor.unwrap_or("-"), "开始导入车辆报价");

        self.import_repo
            .create_batch(&batch_id, filename, ImportStatus::Failed, actor)
            .await
            .map_err(|e| {
                error!(error = %e, "导入批次创建失败");
                ImportError::from(e)
            })?;

        let mut summary = ImportSummary::default();
        let outcome = match self.process(&batch_id, decode, &mut summary).await {
            Ok(processed) => self
                .import_repo
                .update_batch_summary(&batch_id, processed.status, summary)
                .await
                .map(|_| processed)
                .map_err(ImportError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(processed) => {
                let total_errors = processed.errors.total();
                info!(
                    status = %processed.status,
                    total_rows = summary.total_rows,
                    imported_rows = summary.imported_rows,
                    skipped_rows = summary.skipped_rows,
                    total_errors,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "车辆报价导入完成"
                );

                Ok(ImportResult {
                    import_batch_id: batch_id,
                    status: processed.status,
                    summary,
                    errors: processed.errors.into_errors(),
                    total_errors,
                    elapsed_time: start_time.elapsed(),
                })
            }
            Err(e) => {
                error!(error = %e, "导入中断，批次置为 failed");
                self.finalize_failed(&batch_id, &e, summary).await;
                Err(e)
            }
        }
    }

    /// 失败收尾；收尾自身的失败只记日志，不覆盖原错误
    async fn finalize_failed(&self, batch_id: &str, cause: &ImportError, summary: ImportSummary) {
        let message = t_with_args("import.unexpected_failure", &[("error", cause.to_string().as_str())]);

        if let Err(e) = self
            .import_repo
            .insert_error(batch_id, WHOLE_FILE_ROW_NUMBER, None, &message)
            .await
        {
            warn!(error = %e, "整文件错误写入失败");
        }

        if let Err(e) = self
            .import_repo
            .update_batch_summary(batch_id, ImportStatus::Failed, summary)
            .await
        {
            warn!(error = %e, "批次终态更新失败");
        }
    }

    async fn process<F>(
        &self,
        batch_id: &str,
        decode: F,
        summary: &mut ImportSummary,
    ) -> ImporterResult<Processed>
    where
        F: FnOnce() -> ImporterResult<SpreadsheetData> + Send,
    {
        let max_errors = self
            .config
            .get_max_response_errors()
            .await
            .map_err(config_error("import.max_response_errors"))?;
        if max_errors > MAX_RESPONSE_ERRORS {
            warn!(
                configured = max_errors,
                cap = MAX_RESPONSE_ERRORS,
                "响应错误上限超出允许值，按上限截断"
            );
        }
        let mut errors = ErrorCollector::new(max_errors.min(MAX_RESPONSE_ERRORS));

        debug!("步骤 1: 解码表格");
        let sheet = decode()?;
        summary.total_rows = sheet.row_count();
        info!(total_rows = summary.total_rows, "表格解码完成");

        debug!("步骤 2: 表头解析");
        let columns = resolve_column_map(&sheet.headers);
        if !columns.is_complete() {
            warn!(missing = ?columns.missing_required_fields, "缺少必需列");
            for field in &columns.missing_required_fields {
                let message =
                    t_with_args("import.missing_column", &[("header", template_header(*field))]);
                self.record_error(batch_id, HEADER_ROW_NUMBER, Some(*field), message, &mut errors)
                    .await?;
            }
            summary.imported_rows = 0;
            summary.skipped_rows = summary.total_rows;
            return Ok(Processed {
                status: ImportStatus::Failed,
                errors,
            });
        }

        let configured;
        let validator: &dyn RowValidator = match &self.row_validator {
            Some(v) => v.as_ref(),
            None => {
                let min_year = self
                    .config
                    .get_min_year()
                    .await
                    .map_err(config_error("import.min_year"))?;
                let max_year = self
                    .config
                    .get_max_year()
                    .await
                    .map_err(config_error("import.max_year"))?;
                configured = DqValidator::new(min_year, max_year);
                &configured
            }
        };

        debug!("步骤 3: 逐行处理");
        for (index, raw_row) in sheet.rows.iter().enumerate() {
            let row_number = data_row_number(index);
            let row = normalize_row(raw_row, &columns);
            let violations = validator.validate_row(&row);

            if violations.is_empty() {
                self.import_repo.insert_offer(batch_id, &row).await?;
                summary.imported_rows += 1;
                continue;
            }

            debug!(row_number, violations = violations.len(), "行校验失败");
            for violation in violations {
                self.record_error(
                    batch_id,
                    row_number,
                    Some(violation.field),
                    violation.message,
                    &mut errors,
                )
                .await?;
            }
            summary.skipped_rows += 1;
        }

        Ok(Processed {
            status: ImportStatus::from_skipped(summary.skipped_rows),
            errors,
        })
    }

    /// 错误落库（全量）+ 响应收集（截断）
    async fn record_error(
        &self,
        batch_id: &str,
        row_number: usize,
        field: Option<CanonicalField>,
        message: String,
        errors: &mut ErrorCollector,
    ) -> ImporterResult<()> {
        self.import_repo
            .insert_error(batch_id, row_number, field, &message)
            .await?;
        errors.push(RowError {
            row_number,
            field,
            message,
        });
        Ok(())
    }
}

#[async_trait]
impl<R, C> VehicleImporter for VehicleImporterImpl<R, C>
where
    R: VehicleImportRepository,
    C: ImportConfigReader,
{
    async fn import_file(
        &self,
        file_path: &Path,
        actor: Option<&str>,
    ) -> ImporterResult<ImportResult> {
        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        self.run_import(&filename, actor, || self.file_parser.parse_to_sheet(file_path))
            .await
    }

    async fn import_spreadsheet(
        &self,
        filename: &str,
        data: SpreadsheetData,
        actor: Option<&str>,
    ) -> ImporterResult<ImportResult> {
        self.run_import(filename, actor, move || Ok(data)).await
    }

    async fn import_files(
        &self,
        file_paths: Vec<PathBuf>,
        actor: Option<&str>,
    ) -> Vec<Result<ImportResult, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        let import_tasks = file_paths.iter().map(|path| async move {
            let path_str = path.display().to_string();
            match self.import_file(path, actor).await {
                Ok(result) => {
                    info!(
                        file = %path_str,
                        imported_rows = result.summary.imported_rows,
                        "文件导入成功"
                    );
                    Ok(result)
                }
                Err(e) => {
                    error!(file = %path_str, error = %e, "文件导入失败");
                    Err(format!("文件 {} 导入失败: {}", path_str, e))
                }
            }
        });

        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}
