// ==========================================
// 车辆租赁库存系统 - 车辆报价查询仓储
// ==========================================
// 职责: 目录查询（过滤 + 分页），只读
// 约束: 所有过滤值参数化绑定
// ==========================================

use crate::domain::vehicle::{Restricted, VehicleOffer};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_support::{escape_like, parse_ts, WhereBuilder};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// 单页默认条数
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// 单页最大条数
pub const MAX_PAGE_LIMIT: usize = 500;

const OFFER_COLUMNS: &str = "id, import_batch_id, offer_code, status, brand, model, modification, \
                             vehicle_type, year, mileage_km, key_count, pts_type, has_encumbrance, \
                             is_deregistered, responsible_person, storage_address, days_on_sale, \
                             price, yandex_disk_url, booking_status, external_id, crm_ref, \
                             website_url, title, created_at";

// ==========================================
// OfferQuery - 目录查询条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferQuery {
    /// 模糊匹配 标题 / 报价编码 / 品牌 / 型号 / 外部 ID
    pub search: Option<String>,
    pub brand: Option<String>,
    pub status: Option<String>,
    pub booking_status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub year_from: Option<i64>,
    pub year_to: Option<i64>,
    pub import_batch_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl OfferQuery {
    /// 实际生效的分页条数（夹到 [1, MAX_PAGE_LIMIT]）
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    fn where_builder(&self) -> WhereBuilder {
        let mut w = WhereBuilder::new();

        // 两侧统一 unicode_lower，西里尔字母同样大小写无关
        if let Some(search) = non_blank(&self.search) {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            w.push_many(
                "(unicode_lower(title) LIKE ? ESCAPE '\\' \
                 OR unicode_lower(offer_code) LIKE ? ESCAPE '\\' \
                 OR unicode_lower(brand) LIKE ? ESCAPE '\\' \
                 OR unicode_lower(model) LIKE ? ESCAPE '\\' \
                 OR unicode_lower(external_id) LIKE ? ESCAPE '\\')",
                (0..5)
                    .map(|_| Box::new(pattern.clone()) as Box<dyn rusqlite::ToSql>)
                    .collect(),
            );
        }
        if let Some(brand) = non_blank(&self.brand) {
            w.push("unicode_lower(brand) = ?", brand.to_lowercase());
        }
        if let Some(status) = non_blank(&self.status) {
            w.push("unicode_lower(status) = ?", status.to_lowercase());
        }
        if let Some(booking) = non_blank(&self.booking_status) {
            w.push("unicode_lower(booking_status) = ?", booking.to_lowercase());
        }
        if let Some(min) = self.min_price {
            w.push("price >= ?", min);
        }
        if let Some(max) = self.max_price {
            w.push("price <= ?", max);
        }
        if let Some(from) = self.year_from {
            w.push("year >= ?", from);
        }
        if let Some(to) = self.year_to {
            w.push("year <= ?", to);
        }
        if let Some(batch_id) = non_blank(&self.import_batch_id) {
            w.push("import_batch_id = ?", batch_id.to_string());
        }
        w
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPage {
    pub items: Vec<VehicleOffer>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

fn map_offer_row(row: &Row) -> SqliteResult<VehicleOffer> {
    let created_at: String = row.get(24)?;

    Ok(VehicleOffer {
        id: row.get(0)?,
        import_batch_id: row.get(1)?,
        offer_code: row.get(2)?,
        status: row.get(3)?,
        brand: row.get(4)?,
        model: row.get(5)?,
        modification: row.get(6)?,
        vehicle_type: row.get(7)?,
        year: row.get(8)?,
        mileage_km: row.get(9)?,
        key_count: row.get(10)?,
        pts_type: row.get(11)?,
        has_encumbrance: row.get(12)?,
        is_deregistered: row.get(13)?,
        responsible_person: Restricted::Visible(row.get(14)?),
        storage_address: row.get(15)?,
        days_on_sale: row.get(16)?,
        price: row.get(17)?,
        yandex_disk_url: row.get(18)?,
        booking_status: row.get(19)?,
        external_id: row.get(20)?,
        crm_ref: row.get(21)?,
        website_url: Restricted::Visible(row.get(22)?),
        title: row.get(23)?,
        created_at: parse_ts(24, &created_at)?,
    })
}

// ==========================================
// VehicleOfferRepository - 报价查询仓储
// ==========================================
pub struct VehicleOfferRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VehicleOfferRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按条件分页查询（created_at 倒序，同刻按 id）
    pub fn find(&self, query: &OfferQuery) -> RepositoryResult<OfferPage> {
        let conn = self.get_conn()?;
        let w = query.where_builder();
        let limit = query.effective_limit();
        let offset = query.offset.unwrap_or(0);

        let count_sql = format!("SELECT COUNT(*) FROM vehicle_offers{}", w.clause());
        let total: i64 = conn.query_row(&count_sql, w.params().as_slice(), |row| row.get(0))?;

        let sql = format!(
            "SELECT {} FROM vehicle_offers{} ORDER BY created_at DESC, id ASC LIMIT {} OFFSET {}",
            OFFER_COLUMNS,
            w.clause(),
            limit,
            offset
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(w.params().as_slice(), map_offer_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(OfferPage {
            items,
            total: total as usize,
            limit,
            offset,
        })
    }

    /// 按 ID 查询单条报价
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VehicleOffer>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM vehicle_offers WHERE id = ?1", OFFER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![id], map_offer_row) {
            Ok(offer) => Ok(Some(offer)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 去重后的品牌列表（用于过滤下拉）
    pub fn list_brands(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT brand FROM vehicle_offers WHERE brand <> '' ORDER BY brand COLLATE NOCASE",
        )?;
        let brands = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(brands)
    }
}
