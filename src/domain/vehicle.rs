// ==========================================
// 车辆租赁库存系统 - 车辆报价领域模型
// ==========================================
// 职责: 规范行（内存）/ 可落库报价 / 已落库报价
// 红线: RawText 不进入类型化列，落库前必须全部 Parsed
// ==========================================

use crate::domain::types::{CanonicalField, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// FieldValue - 解析值 / 原文回退 / 缺失
// ==========================================
// 用途: key_count / has_encumbrance / is_deregistered
// 说明: 解析失败但原文非空 → RawText，便于区分"缺失"与"格式错误"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue<T> {
    Parsed(T),
    RawText(String),
    Absent,
}

impl<T> FieldValue<T> {
    /// 由解析结果与规范化原文构造
    pub fn from_parse(parsed: Option<T>, normalized_raw: String) -> Self {
        match parsed {
            Some(v) => FieldValue::Parsed(v),
            None if !normalized_raw.is_empty() => FieldValue::RawText(normalized_raw),
            None => FieldValue::Absent,
        }
    }

    pub fn parsed(&self) -> Option<&T> {
        match self {
            FieldValue::Parsed(v) => Some(v),
            _ => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            FieldValue::RawText(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl<T> Default for FieldValue<T> {
    fn default() -> Self {
        FieldValue::Absent
    }
}

// ==========================================
// CanonicalVehicleOfferRow - 规范行（落库前）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVehicleOfferRow {
    pub offer_code: String,
    pub status: String,
    pub brand: String,
    pub model: String,
    pub modification: String,
    pub vehicle_type: String,
    pub year: Option<i64>,
    pub mileage_km: Option<i64>,
    pub key_count: FieldValue<i64>,
    pub pts_type: String,
    pub has_encumbrance: FieldValue<bool>,
    pub is_deregistered: FieldValue<bool>,
    pub responsible_person: String,
    pub storage_address: String,
    pub days_on_sale: Option<i64>,
    pub price: Option<f64>,
    pub yandex_disk_url: Option<String>,
    pub booking_status: String,
    pub external_id: String,
    pub crm_ref: String,
    pub website_url: Option<String>,

    // 派生: 品牌 + 型号 + 改款，空则回退报价编码
    pub title: String,
}

// ==========================================
// NewVehicleOffer - 可落库报价
// ==========================================
// 所有必填数值 / 布尔字段均已确定
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicleOffer {
    pub offer_code: String,
    pub status: String,
    pub brand: String,
    pub model: String,
    pub modification: String,
    pub vehicle_type: String,
    pub year: i64,
    pub mileage_km: i64,
    pub key_count: i64,
    pub pts_type: String,
    pub has_encumbrance: bool,
    pub is_deregistered: bool,
    pub responsible_person: String,
    pub storage_address: String,
    pub days_on_sale: i64,
    pub price: f64,
    pub yandex_disk_url: Option<String>,
    pub booking_status: String,
    pub external_id: String,
    pub crm_ref: String,
    pub website_url: Option<String>,
    pub title: String,
}

impl TryFrom<&CanonicalVehicleOfferRow> for NewVehicleOffer {
    /// 第一个未确定的字段
    type Error = CanonicalField;

    fn try_from(row: &CanonicalVehicleOfferRow) -> Result<Self, Self::Error> {
        Ok(Self {
            offer_code: row.offer_code.clone(),
            status: row.status.clone(),
            brand: row.brand.clone(),
            model: row.model.clone(),
            modification: row.modification.clone(),
            vehicle_type: row.vehicle_type.clone(),
            year: row.year.ok_or(CanonicalField::Year)?,
            mileage_km: row.mileage_km.ok_or(CanonicalField::MileageKm)?,
            key_count: *row.key_count.parsed().ok_or(CanonicalField::KeyCount)?,
            pts_type: row.pts_type.clone(),
            has_encumbrance: *row
                .has_encumbrance
                .parsed()
                .ok_or(CanonicalField::HasEncumbrance)?,
            is_deregistered: *row
                .is_deregistered
                .parsed()
                .ok_or(CanonicalField::IsDeregistered)?,
            responsible_person: row.responsible_person.clone(),
            storage_address: row.storage_address.clone(),
            days_on_sale: row.days_on_sale.ok_or(CanonicalField::DaysOnSale)?,
            price: row.price.ok_or(CanonicalField::Price)?,
            yandex_disk_url: row.yandex_disk_url.clone(),
            booking_status: row.booking_status.clone(),
            external_id: row.external_id.clone(),
            crm_ref: row.crm_ref.clone(),
            website_url: row.website_url.clone(),
            title: row.title.clone(),
        })
    }
}

// ==========================================
// Restricted - 按角色可见的字段
// ==========================================
// 序列化: Visible(v) 按 v 输出（含 null）；Redacted 由字段属性整体省略
#[derive(Debug, Clone, PartialEq)]
pub enum Restricted<T> {
    Visible(T),
    Redacted,
}

impl<T> Restricted<T> {
    pub fn visible(&self) -> Option<&T> {
        match self {
            Restricted::Visible(v) => Some(v),
            Restricted::Redacted => None,
        }
    }

    pub fn is_redacted(&self) -> bool {
        matches!(self, Restricted::Redacted)
    }
}

impl<T> Default for Restricted<T> {
    fn default() -> Self {
        Restricted::Redacted
    }
}

impl<T: Serialize> Serialize for Restricted<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Restricted::Visible(v) => v.serialize(serializer),
            Restricted::Redacted => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Restricted<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Restricted::Visible)
    }
}

// ==========================================
// VehicleOffer - 已落库报价
// ==========================================
// 对齐: vehicle_offers 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleOffer {
    pub id: i64,
    pub import_batch_id: String,
    pub offer_code: String,
    pub status: String,
    pub brand: String,
    pub model: String,
    pub modification: String,
    pub vehicle_type: String,
    pub year: i64,
    pub mileage_km: i64,
    pub key_count: i64,
    pub pts_type: String,
    pub has_encumbrance: bool,
    pub is_deregistered: bool,
    #[serde(default, skip_serializing_if = "Restricted::is_redacted")]
    pub responsible_person: Restricted<String>,
    pub storage_address: String,
    pub days_on_sale: i64,
    pub price: f64,
    pub yandex_disk_url: Option<String>,
    pub booking_status: String,
    pub external_id: String,
    pub crm_ref: String,
    #[serde(default, skip_serializing_if = "Restricted::is_redacted")]
    pub website_url: Restricted<Option<String>>,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl VehicleOffer {
    /// 按角色脱敏（非管理员不可见负责人 / 网站链接）
    pub fn redact_for(mut self, role: Role) -> Self {
        if !role.can_view_restricted_fields() {
            self.responsible_person = Restricted::Redacted;
            self.website_url = Restricted::Redacted;
        }
        self
    }
}
