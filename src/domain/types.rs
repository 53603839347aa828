// ==========================================
// 车辆租赁库存系统 - 领域类型定义
// ==========================================
// 职责: 规范字段 / 批次状态 / 角色 等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CanonicalField - 规范字段（21 个）
// ==========================================
// 顺序即声明顺序: 缺失字段报告按此顺序输出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    OfferCode,
    Status,
    Brand,
    Model,
    Modification,
    VehicleType,
    Year,
    MileageKm,
    KeyCount,
    PtsType,
    HasEncumbrance,
    IsDeregistered,
    ResponsiblePerson,
    StorageAddress,
    DaysOnSale,
    Price,
    YandexDiskUrl,
    BookingStatus,
    ExternalId,
    CrmRef,
    WebsiteUrl,
}

impl CanonicalField {
    /// 全部规范字段（声明顺序）
    pub const ALL: [CanonicalField; 21] = [
        CanonicalField::OfferCode,
        CanonicalField::Status,
        CanonicalField::Brand,
        CanonicalField::Model,
        CanonicalField::Modification,
        CanonicalField::VehicleType,
        CanonicalField::Year,
        CanonicalField::MileageKm,
        CanonicalField::KeyCount,
        CanonicalField::PtsType,
        CanonicalField::HasEncumbrance,
        CanonicalField::IsDeregistered,
        CanonicalField::ResponsiblePerson,
        CanonicalField::StorageAddress,
        CanonicalField::DaysOnSale,
        CanonicalField::Price,
        CanonicalField::YandexDiskUrl,
        CanonicalField::BookingStatus,
        CanonicalField::ExternalId,
        CanonicalField::CrmRef,
        CanonicalField::WebsiteUrl,
    ];

    /// 字段标识（与 API / import_errors.field 一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::OfferCode => "offerCode",
            CanonicalField::Status => "status",
            CanonicalField::Brand => "brand",
            CanonicalField::Model => "model",
            CanonicalField::Modification => "modification",
            CanonicalField::VehicleType => "vehicleType",
            CanonicalField::Year => "year",
            CanonicalField::MileageKm => "mileageKm",
            CanonicalField::KeyCount => "keyCount",
            CanonicalField::PtsType => "ptsType",
            CanonicalField::HasEncumbrance => "hasEncumbrance",
            CanonicalField::IsDeregistered => "isDeregistered",
            CanonicalField::ResponsiblePerson => "responsiblePerson",
            CanonicalField::StorageAddress => "storageAddress",
            CanonicalField::DaysOnSale => "daysOnSale",
            CanonicalField::Price => "price",
            CanonicalField::YandexDiskUrl => "yandexDiskUrl",
            CanonicalField::BookingStatus => "bookingStatus",
            CanonicalField::ExternalId => "externalId",
            CanonicalField::CrmRef => "crmRef",
            CanonicalField::WebsiteUrl => "websiteUrl",
        }
    }

    /// 从字段标识解析（数据库读取时使用）
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == raw.trim())
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// ImportStatus - 导入批次状态
// ==========================================
// 创建时默认 Failed（占位），结束时更新为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Completed,
    CompletedWithErrors,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Completed => "completed",
            ImportStatus::CompletedWithErrors => "completed_with_errors",
            ImportStatus::Failed => "failed",
        }
    }

    /// 未知值按 Failed 处理
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "completed" => ImportStatus::Completed,
            "completed_with_errors" => ImportStatus::CompletedWithErrors,
            _ => ImportStatus::Failed,
        }
    }

    /// 按跳过行数推导终态
    pub fn from_skipped(skipped_rows: usize) -> Self {
        if skipped_rows > 0 {
            ImportStatus::CompletedWithErrors
        } else {
            ImportStatus::Completed
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Role - 调用方角色
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Viewer,
}

impl Role {
    /// 是否可见负责人 / 网站链接
    pub fn can_view_restricted_fields(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}
