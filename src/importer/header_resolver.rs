// ==========================================
// 车辆租赁库存系统 - 表头解析器
// ==========================================
// 职责: 原始表头 → 规范字段列号映射
// 规则: 每个字段取第一个别名命中的列；后续重复列忽略
// 约束: 不抛错，缺失字段通过 missing_required_fields 报告
// ==========================================

use crate::domain::spreadsheet::Cell;
use crate::domain::types::CanonicalField;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

// ==========================================
// 表头别名表（俄文 + 英文）
// ==========================================
// 第一个别名同时作为模板表头
const HEADER_ALIASES: [(CanonicalField, &[&str]); 21] = [
    (
        CanonicalField::OfferCode,
        &["Код предложения", "Код оффера", "Номер предложения", "Код лота", "Артикул", "Offer code", "Offer ID"],
    ),
    (CanonicalField::Status, &["Статус", "Статус предложения", "Status"]),
    (CanonicalField::Brand, &["Марка", "Бренд", "Brand", "Make"]),
    (CanonicalField::Model, &["Модель", "Model"]),
    (
        CanonicalField::Modification,
        &["Модификация", "Комплектация", "Modification", "Trim"],
    ),
    (
        CanonicalField::VehicleType,
        &["Тип ТС", "Тип транспортного средства", "Тип техники", "Vehicle type"],
    ),
    (CanonicalField::Year, &["Год выпуска", "Год", "Year", "Model year"]),
    (
        CanonicalField::MileageKm,
        &["Пробег, км", "Пробег", "Пробег (км)", "Mileage", "Mileage, km", "Mileage km"],
    ),
    (
        CanonicalField::KeyCount,
        &["Количество ключей", "Кол-во ключей", "Ключи", "Key count", "Keys"],
    ),
    (
        CanonicalField::PtsType,
        &["Тип ПТС", "ПТС", "PTS type", "Vehicle passport type"],
    ),
    (
        CanonicalField::HasEncumbrance,
        &["Обременение", "Наличие обременения", "Есть обременение", "Encumbrance", "Has encumbrance"],
    ),
    (
        CanonicalField::IsDeregistered,
        &["Снят с учета", "Снято с учета", "Deregistered", "Is deregistered"],
    ),
    (
        CanonicalField::ResponsiblePerson,
        &["Ответственный", "Ответственное лицо", "Ответственный менеджер", "Responsible person", "Responsible"],
    ),
    (
        CanonicalField::StorageAddress,
        &["Адрес хранения", "Место хранения", "Адрес стоянки", "Storage address", "Storage location"],
    ),
    (
        CanonicalField::DaysOnSale,
        &["Дней в продаже", "Дни в продаже", "Срок экспозиции", "Days on sale"],
    ),
    (
        CanonicalField::Price,
        &["Цена", "Стоимость", "Цена, руб", "Цена (руб.)", "Price"],
    ),
    (
        CanonicalField::YandexDiskUrl,
        &["Ссылка на Яндекс Диск", "Яндекс Диск", "Яндекс.Диск", "Фото", "Yandex Disk URL", "Yandex Disk", "Photos"],
    ),
    (
        CanonicalField::BookingStatus,
        &["Статус бронирования", "Бронь", "Бронирование", "Booking status", "Booking"],
    ),
    (
        CanonicalField::ExternalId,
        &["Внешний ID", "Внешний идентификатор", "External ID", "ID"],
    ),
    (
        CanonicalField::CrmRef,
        &["Ссылка на CRM", "Номер в CRM", "CRM", "CRM ref", "CRM reference"],
    ),
    (
        CanonicalField::WebsiteUrl,
        &["Ссылка на сайт", "Сайт", "URL на сайте", "Website URL", "Website"],
    ),
];

// 西里尔 → 拉丁 形近字（小写后比较，表头与别名两侧统一替换）
const LOOKALIKES: [(char, char); 13] = [
    ('а', 'a'),
    ('в', 'b'),
    ('с', 'c'),
    ('е', 'e'),
    ('ё', 'e'),
    ('н', 'h'),
    ('к', 'k'),
    ('м', 'm'),
    ('о', 'o'),
    ('р', 'p'),
    ('т', 't'),
    ('х', 'x'),
    ('у', 'y'),
];

static NORMALIZED_ALIASES: Lazy<Vec<(CanonicalField, Vec<String>)>> = Lazy::new(|| {
    HEADER_ALIASES
        .iter()
        .map(|(field, aliases)| {
            (
                *field,
                aliases.iter().map(|alias| normalize_header(alias)).collect(),
            )
        })
        .collect()
});

/// 表头规范化: NFKC + 小写 + 删除冒号 + 折叠空白 + 形近字替换
pub fn normalize_header(raw: &str) -> String {
    let lowered: String = raw.nfkc().collect::<String>().to_lowercase();
    let without_colons = lowered.replace(':', "");
    let collapsed = without_colons
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    collapsed
        .chars()
        .map(|c| {
            LOOKALIKES
                .iter()
                .find(|(cyrillic, _)| *cyrillic == c)
                .map(|(_, latin)| *latin)
                .unwrap_or(c)
        })
        .collect()
}

/// 模板表头（每个字段的首选别名，声明顺序）
pub fn template_headers() -> Vec<&'static str> {
    HEADER_ALIASES.iter().map(|(_, aliases)| aliases[0]).collect()
}

/// 单个字段的模板表头
pub fn template_header(field: CanonicalField) -> &'static str {
    HEADER_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, aliases)| aliases[0])
        .unwrap_or_else(|| field.as_str())
}

// ==========================================
// ColumnMap - 字段 → 列号
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub field_to_column: HashMap<CanonicalField, usize>,
    /// 未命中的规范字段（声明顺序）
    pub missing_required_fields: Vec<CanonicalField>,
}

impl ColumnMap {
    pub fn column_for(&self, field: CanonicalField) -> Option<usize> {
        self.field_to_column.get(&field).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required_fields.is_empty()
    }
}

/// 解析表头
pub fn resolve_column_map(raw_headers: &[Cell]) -> ColumnMap {
    let normalized: Vec<String> = raw_headers
        .iter()
        .map(|cell| normalize_header(&cell.to_text()))
        .collect();

    let mut map = ColumnMap::default();
    for (field, aliases) in NORMALIZED_ALIASES.iter() {
        let hit = normalized
            .iter()
            .position(|header| !header.is_empty() && aliases.iter().any(|a| a == header));
        match hit {
            Some(column) => {
                map.field_to_column.insert(*field, column);
            }
            None => map.missing_required_fields.push(*field),
        }
    }
    map
}
