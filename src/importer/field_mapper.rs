// ==========================================
// 车辆租赁库存系统 - 行规范化器
// ==========================================
// 职责: 原始行 + 列映射 → CanonicalVehicleOfferRow
// 约束: 不抛错；未映射 / 越界列视为空
// ==========================================

use crate::domain::spreadsheet::Cell;
use crate::domain::types::CanonicalField;
use crate::domain::vehicle::{CanonicalVehicleOfferRow, FieldValue};
use crate::importer::data_cleaner::{
    build_title, normalize_text, normalize_url, parse_boolean, parse_integer, parse_price,
};
use crate::importer::header_resolver::ColumnMap;

pub struct FieldMapper<'a> {
    columns: &'a ColumnMap,
}

impl<'a> FieldMapper<'a> {
    pub fn new(columns: &'a ColumnMap) -> Self {
        Self { columns }
    }

    /// 取字段原始文本（未映射 → 空串）
    fn raw(&self, row: &[Cell], field: CanonicalField) -> String {
        self.columns
            .column_for(field)
            .and_then(|idx| row.get(idx))
            .map(Cell::to_text)
            .unwrap_or_default()
    }

    fn text(&self, row: &[Cell], field: CanonicalField) -> String {
        normalize_text(&self.raw(row, field))
    }

    fn integer(&self, row: &[Cell], field: CanonicalField) -> Option<i64> {
        parse_integer(&self.raw(row, field))
    }

    /// 整数 + 原文回退
    fn integer_or_raw(&self, row: &[Cell], field: CanonicalField) -> FieldValue<i64> {
        let raw = self.raw(row, field);
        FieldValue::from_parse(parse_integer(&raw), normalize_text(&raw))
    }

    /// 布尔 + 原文回退
    fn boolean_or_raw(&self, row: &[Cell], field: CanonicalField) -> FieldValue<bool> {
        let raw = self.raw(row, field);
        FieldValue::from_parse(parse_boolean(&raw), normalize_text(&raw))
    }

    /// 映射为规范行
    pub fn map_to_canonical(&self, row: &[Cell]) -> CanonicalVehicleOfferRow {
        let offer_code = self.text(row, CanonicalField::OfferCode);
        let brand = self.text(row, CanonicalField::Brand);
        let model = self.text(row, CanonicalField::Model);
        let modification = self.text(row, CanonicalField::Modification);
        let title = build_title(&brand, &model, &modification, &offer_code);

        CanonicalVehicleOfferRow {
            status: self.text(row, CanonicalField::Status),
            vehicle_type: self.text(row, CanonicalField::VehicleType),
            year: self.integer(row, CanonicalField::Year),
            mileage_km: self.integer(row, CanonicalField::MileageKm),
            key_count: self.integer_or_raw(row, CanonicalField::KeyCount),
            pts_type: self.text(row, CanonicalField::PtsType),
            has_encumbrance: self.boolean_or_raw(row, CanonicalField::HasEncumbrance),
            is_deregistered: self.boolean_or_raw(row, CanonicalField::IsDeregistered),
            responsible_person: self.text(row, CanonicalField::ResponsiblePerson),
            storage_address: self.text(row, CanonicalField::StorageAddress),
            days_on_sale: self.integer(row, CanonicalField::DaysOnSale),
            price: parse_price(&self.raw(row, CanonicalField::Price)),
            yandex_disk_url: normalize_url(&self.raw(row, CanonicalField::YandexDiskUrl)),
            booking_status: self.text(row, CanonicalField::BookingStatus),
            external_id: self.text(row, CanonicalField::ExternalId),
            crm_ref: self.text(row, CanonicalField::CrmRef),
            website_url: normalize_url(&self.raw(row, CanonicalField::WebsiteUrl)),
            offer_code,
            brand,
            model,
            modification,
            title,
        }
    }
}

/// 便捷函数
pub fn normalize_row(row: &[Cell], columns: &ColumnMap) -> CanonicalVehicleOfferRow {
    FieldMapper::new(columns).map_to_canonical(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::header_resolver::{resolve_column_map, template_headers};

    fn template_map() -> ColumnMap {
        let headers: Vec<Cell> = template_headers().into_iter().map(Cell::from).collect();
        resolve_column_map(&headers)
    }

    fn sample_row() -> Vec<Cell> {
        vec![
            Cell::from(" OFR-1 "),
            Cell::from("В продаже"),
            Cell::from("Toyota"),
            Cell::from("Camry"),
            Cell::Empty,
            Cell::from("Легковой"),
            Cell::Number(2020.0),
            Cell::from("45 000"),
            Cell::from("2"),
            Cell::from("Электронный"),
            Cell::from("Нет"),
            Cell::from("да"),
            Cell::from("Иванов И.И."),
            Cell::from("Москва,  ул. Ленина 1"),
            Cell::Number(12.0),
            Cell::from("1 950 000,50"),
            Cell::from("disk.yandex.ru/d/abc"),
            Cell::from("Свободен"),
            Cell::from("EXT-9"),
            Cell::from("CRM-77"),
            Cell::Empty,
        ]
    }

    #[test]
    fn test_map_full_row() {
        let map = template_map();
        let row = normalize_row(&sample_row(), &map);

        assert_eq!(row.offer_code, "OFR-1");
        assert_eq!(row.title, "Toyota Camry");
        assert_eq!(row.year, Some(2020));
        assert_eq!(row.mileage_km, Some(45000));
        assert_eq!(row.key_count, FieldValue::Parsed(2));
        assert_eq!(row.has_encumbrance, FieldValue::Parsed(false));
        assert_eq!(row.is_deregistered, FieldValue::Parsed(true));
        assert_eq!(row.storage_address, "Москва, ул. Ленина 1");
        assert_eq!(row.price, Some(1950000.5));
        assert_eq!(
            row.yandex_disk_url.as_deref(),
            Some("https://disk.yandex.ru/d/abc")
        );
        assert_eq!(row.website_url, None);
    }

    #[test]
    fn test_fallback_to_raw_text() {
        let map = template_map();
        let mut cells = sample_row();
        cells[8] = Cell::from("два");
        cells[10] = Cell::from("возможно");
        cells[11] = Cell::Empty;

        let row = normalize_row(&cells, &map);
        assert_eq!(row.key_count, FieldValue::RawText("два".to_string()));
        assert_eq!(row.has_encumbrance, FieldValue::RawText("возможно".to_string()));
        assert_eq!(row.is_deregistered, FieldValue::Absent);
    }

    #[test]
    fn test_short_row_yields_empty_values() {
        let map = template_map();
        let row = normalize_row(&[Cell::from("OFR-2")], &map);
        assert_eq!(row.offer_code, "OFR-2");
        assert_eq!(row.title, "OFR-2");
        assert_eq!(row.year, None);
        assert_eq!(row.key_count, FieldValue::Absent);
        assert_eq!(row.brand, "");
    }

    #[test]
    fn test_unmapped_columns() {
        let map = ColumnMap::default();
        let row = normalize_row(&sample_row(), &map);
        assert_eq!(row, CanonicalVehicleOfferRow::default());
    }
}
