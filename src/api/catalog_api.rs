// ==========================================
// 车辆报价目录API
// ==========================================
// 职责: 目录查询 + 按角色脱敏
// 说明: 仅 Admin 可见 负责人 / 网站链接
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::Role;
use crate::domain::vehicle::VehicleOffer;
use crate::repository::{OfferPage, OfferQuery, VehicleOfferRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 目录API
pub struct CatalogApi {
    offer_repo: VehicleOfferRepository,
}

impl CatalogApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            offer_repo: VehicleOfferRepository::new(conn),
        }
    }

    /// 分页查询报价
    ///
    /// # 参数
    /// - query: 过滤条件（limit 夹到 [1, 500]）
    /// - role: 调用方角色
    pub fn list_offers(&self, query: &OfferQuery, role: Role) -> ApiResult<OfferPage> {
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(ApiError::InvalidInput(format!(
                    "价格区间无效: min={} > max={}",
                    min, max
                )));
            }
        }
        if let (Some(from), Some(to)) = (query.year_from, query.year_to) {
            if from > to {
                return Err(ApiError::InvalidInput(format!(
                    "年份区间无效: from={} > to={}",
                    from, to
                )));
            }
        }

        let mut page = self.offer_repo.find(query)?;
        page.items = page
            .items
            .into_iter()
            .map(|offer| offer.redact_for(role))
            .collect();
        Ok(page)
    }

    /// 查询单条报价
    pub fn get_offer(&self, id: i64, role: Role) -> ApiResult<VehicleOffer> {
        self.offer_repo
            .find_by_id(id)?
            .map(|offer| offer.redact_for(role))
            .ok_or_else(|| ApiError::NotFound(format!("VehicleOffer(id={})不存在", id)))
    }

    /// 品牌列表
    pub fn list_brands(&self) -> ApiResult<Vec<String>> {
        Ok(self.offer_repo.list_brands()?)
    }
}
