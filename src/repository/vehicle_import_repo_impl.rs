// ==========================================
// 车辆租赁库存系统 - 导入台账 Repository 实现
// ==========================================
// 职责: 实现导入批次 / 错误 / 报价的数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::{ImportBatch, ImportErrorRecord, ImportSummary};
use crate::domain::types::{CanonicalField, ImportStatus};
use crate::domain::vehicle::{CanonicalVehicleOfferRow, NewVehicleOffer};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::{format_ts, parse_opt_ts, parse_ts};
use crate::repository::vehicle_import_repo::{ClearSummary, VehicleImportRepository};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const BATCH_COLUMNS: &str = "id, filename, status, total_rows, imported_rows, skipped_rows, \
                             created_by, created_at, finished_at";

/// 行内未确定字段 → 仓储错误（原文只出现在消息中）
fn undetermined_field_error(row: &CanonicalVehicleOfferRow, field: CanonicalField) -> RepositoryError {
    let raw = match field {
        CanonicalField::KeyCount => row.key_count.raw_text(),
        CanonicalField::HasEncumbrance => row.has_encumbrance.raw_text(),
        CanonicalField::IsDeregistered => row.is_deregistered.raw_text(),
        _ => None,
    };
    let message = match raw {
        Some(text) => format!("值未能解析: {}", text),
        None => "值缺失".to_string(),
    };
    RepositoryError::FieldValueError { field, message }
}

fn map_batch_row(row: &Row) -> SqliteResult<ImportBatch> {
    let status: String = row.get(2)?;
    let created_at: String = row.get(7)?;
    let finished_at: Option<String> = row.get(8)?;

    Ok(ImportBatch {
        id: row.get(0)?,
        filename: row.get(1)?,
        status: ImportStatus::parse(&status),
        total_rows: row.get::<_, i64>(3)? as usize,
        imported_rows: row.get::<_, i64>(4)? as usize,
        skipped_rows: row.get::<_, i64>(5)? as usize,
        created_by: row.get(6)?,
        created_at: parse_ts(7, &created_at)?,
        finished_at: parse_opt_ts(8, finished_at)?,
    })
}

fn map_error_row(row: &Row) -> SqliteResult<ImportErrorRecord> {
    let field: Option<String> = row.get(3)?;
    let created_at: String = row.get(5)?;

    Ok(ImportErrorRecord {
        id: row.get(0)?,
        import_batch_id: row.get(1)?,
        row_number: row.get::<_, i64>(2)? as usize,
        field: field.as_deref().and_then(CanonicalField::parse),
        message: row.get(4)?,
        created_at: parse_ts(5, &created_at)?,
    })
}

// ==========================================
// VehicleImportRepositoryImpl
// ==========================================
pub struct VehicleImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl VehicleImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（表结构须已由 db::init_schema 建好）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 复用已打开的共享连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl VehicleImportRepository for VehicleImportRepositoryImpl {
    async fn create_batch(
        &self,
        id: &str,
        filename: &str,
        status: ImportStatus,
        created_by: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_batches (
                id, filename, status, total_rows, imported_rows, skipped_rows,
                created_by, created_at, finished_at
            ) VALUES (?1, ?2, ?3, 0, 0, 0, ?4, ?5, NULL)
            "#,
            params![id, filename, status.as_str(), created_by, format_ts(Utc::now())],
        )?;
        Ok(())
    }

    async fn update_batch_summary(
        &self,
        id: &str,
        status: ImportStatus,
        summary: ImportSummary,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE import_batches
            SET status = ?2, total_rows = ?3, imported_rows = ?4, skipped_rows = ?5,
                finished_at = ?6
            WHERE id = ?1
            "#,
            params![
                id,
                status.as_str(),
                summary.total_rows as i64,
                summary.imported_rows as i64,
                summary.skipped_rows as i64,
                format_ts(Utc::now()),
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ImportBatch".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_batch(&self, id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM import_batches WHERE id = ?1", BATCH_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![id], map_batch_row) {
            Ok(batch) => Ok(Some(batch)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM import_batches ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![limit as i64], map_batch_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(batches)
    }

    async fn insert_error(
        &self,
        batch_id: &str,
        row_number: usize,
        field: Option<CanonicalField>,
        message: &str,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_errors (import_batch_id, row_number, field, message, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                batch_id,
                row_number as i64,
                field.map(|f| f.as_str()),
                message,
                format_ts(Utc::now()),
            ],
        )?;
        Ok(())
    }

    async fn list_errors_by_batch(
        &self,
        batch_id: &str,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Vec<ImportErrorRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, import_batch_id, row_number, field, message, created_at
            FROM import_errors
            WHERE import_batch_id = ?1
            ORDER BY row_number ASC, id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let errors = stmt
            .query_map(params![batch_id, limit as i64, offset as i64], map_error_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(errors)
    }

    async fn count_errors_by_batch(&self, batch_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM import_errors WHERE import_batch_id = ?1",
            params![batch_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn insert_offer(
        &self,
        batch_id: &str,
        row: &CanonicalVehicleOfferRow,
    ) -> RepositoryResult<i64> {
        let offer =
            NewVehicleOffer::try_from(row).map_err(|field| undetermined_field_error(row, field))?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO vehicle_offers (
                import_batch_id, offer_code, status, brand, model, modification,
                vehicle_type, year, mileage_km, key_count, pts_type,
                has_encumbrance, is_deregistered, responsible_person, storage_address,
                days_on_sale, price, yandex_disk_url, booking_status, external_id,
                crm_ref, website_url, title, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
            )
            "#,
            params![
                batch_id,
                offer.offer_code,
                offer.status,
                offer.brand,
                offer.model,
                offer.modification,
                offer.vehicle_type,
                offer.year,
                offer.mileage_km,
                offer.key_count,
                offer.pts_type,
                offer.has_encumbrance,
                offer.is_deregistered,
                offer.responsible_person,
                offer.storage_address,
                offer.days_on_sale,
                offer.price,
                offer.yandex_disk_url,
                offer.booking_status,
                offer.external_id,
                offer.crm_ref,
                offer.website_url,
                offer.title,
                format_ts(Utc::now()),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(id)
    }

    async fn count_offers_by_batch(&self, batch_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM vehicle_offers WHERE import_batch_id = ?1",
            params![batch_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn clear_all(&self) -> RepositoryResult<ClearSummary> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 先删子表，再删批次（外键约束）
        let deleted_offers = tx.execute("DELETE FROM vehicle_offers", [])?;
        let deleted_errors = tx.execute("DELETE FROM import_errors", [])?;
        let deleted_batches = tx.execute("DELETE FROM import_batches", [])?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(ClearSummary {
            deleted_offers,
            deleted_errors,
            deleted_batches,
        })
    }
}
