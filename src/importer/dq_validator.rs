// ==========================================
// 车辆租赁库存系统 - 行校验器实现
// ==========================================
// 职责: 逐字段存在性 / 范围校验，返回全部违规
// 说明: 任一违规 → 整行拒绝（不部分落库）
// ==========================================

use crate::domain::types::CanonicalField;
use crate::domain::vehicle::{CanonicalVehicleOfferRow, FieldValue};
use crate::i18n::{t, t_with_args};
use crate::importer::vehicle_importer_trait::RowValidator;
use serde::{Deserialize, Serialize};

/// 年份默认下限（含）
pub const DEFAULT_MIN_YEAR: i64 = 1950;
/// 年份默认上限（含）
pub const DEFAULT_MAX_YEAR: i64 = 2100;

/// 字段级违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: CanonicalField,
    pub message: String,
}

impl FieldViolation {
    fn new(field: CanonicalField, message: String) -> Self {
        Self { field, message }
    }
}

pub struct DqValidator {
    min_year: i64,
    max_year: i64,
}

impl DqValidator {
    pub fn new(min_year: i64, max_year: i64) -> Self {
        Self { min_year, max_year }
    }

    fn check_year(&self, year: Option<i64>, out: &mut Vec<FieldViolation>) {
        match year {
            None => out.push(FieldViolation::new(
                CanonicalField::Year,
                t("validation.year_required"),
            )),
            Some(y) if y < self.min_year || y > self.max_year => {
                out.push(FieldViolation::new(
                    CanonicalField::Year,
                    t_with_args(
                        "validation.year_out_of_range",
                        &[
                            ("value", y.to_string().as_str()),
                            ("min", self.min_year.to_string().as_str()),
                            ("max", self.max_year.to_string().as_str()),
                        ],
                    ),
                ))
            }
            Some(_) => {}
        }
    }
}

impl Default for DqValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_YEAR, DEFAULT_MAX_YEAR)
    }
}

/// 必填数值
fn check_present<T>(
    value: &Option<T>,
    field: CanonicalField,
    key: &str,
    out: &mut Vec<FieldViolation>,
) {
    if value.is_none() {
        out.push(FieldViolation::new(field, t(key)));
    }
}

/// 非 Parsed 即违规；RawText 在消息中带出原文
fn check_parsed<T>(
    value: &FieldValue<T>,
    field: CanonicalField,
    key_prefix: &str,
    out: &mut Vec<FieldViolation>,
) {
    match value {
        FieldValue::Parsed(_) => {}
        FieldValue::RawText(raw) => out.push(FieldViolation::new(
            field,
            t_with_args(&format!("{}_invalid", key_prefix), &[("value", raw.as_str())]),
        )),
        FieldValue::Absent => out.push(FieldViolation::new(
            field,
            t(&format!("{}_required", key_prefix)),
        )),
    }
}

impl RowValidator for DqValidator {
    fn validate_row(&self, row: &CanonicalVehicleOfferRow) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if row.offer_code.is_empty() {
            violations.push(FieldViolation::new(
                CanonicalField::OfferCode,
                t("validation.offer_code_required"),
            ));
        }

        self.check_year(row.year, &mut violations);
        check_present(
            &row.mileage_km,
            CanonicalField::MileageKm,
            "validation.mileage_required",
            &mut violations,
        );
        check_parsed(
            &row.key_count,
            CanonicalField::KeyCount,
            "validation.key_count",
            &mut violations,
        );
        check_parsed(
            &row.has_encumbrance,
            CanonicalField::HasEncumbrance,
            "validation.has_encumbrance",
            &mut violations,
        );
        check_parsed(
            &row.is_deregistered,
            CanonicalField::IsDeregistered,
            "validation.is_deregistered",
            &mut violations,
        );
        check_present(
            &row.days_on_sale,
            CanonicalField::DaysOnSale,
            "validation.days_on_sale_required",
            &mut violations,
        );
        check_present(
            &row.price,
            CanonicalField::Price,
            "validation.price_required",
            &mut violations,
        );

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_row() -> CanonicalVehicleOfferRow {
        CanonicalVehicleOfferRow {
            offer_code: "OFR-1".to_string(),
            year: Some(2020),
            mileage_km: Some(10_000),
            key_count: FieldValue::Parsed(2),
            has_encumbrance: FieldValue::Parsed(false),
            is_deregistered: FieldValue::Parsed(false),
            days_on_sale: Some(3),
            price: Some(1_000_000.0),
            title: "OFR-1".to_string(),
            ..Default::default()
        }
    }

    fn fields(violations: &[FieldViolation]) -> Vec<CanonicalField> {
        violations.iter().map(|v| v.field).collect()
    }

    #[test]
    fn test_valid_row_has_no_violations() {
        let validator = DqValidator::default();
        assert!(validator.validate_row(&valid_row()).is_empty());
    }

    #[test]
    fn test_empty_text_fields_are_allowed() {
        let validator = DqValidator::default();
        let row = CanonicalVehicleOfferRow {
            brand: String::new(),
            model: String::new(),
            ..valid_row()
        };
        assert!(validator.validate_row(&row).is_empty());
    }

    #[test]
    fn test_year_range_inclusive() {
        let validator = DqValidator::default();
        for (year, ok) in [(1800, false), (1949, false), (1950, true), (2100, true), (2101, false)] {
            let row = CanonicalVehicleOfferRow {
                year: Some(year),
                ..valid_row()
            };
            let violations = validator.validate_row(&row);
            assert_eq!(violations.is_empty(), ok, "year {}", year);
            if !ok {
                assert_eq!(fields(&violations), vec![CanonicalField::Year]);
            }
        }
    }

    #[test]
    fn test_all_violations_reported() {
        let validator = DqValidator::default();
        let violations = validator.validate_row(&CanonicalVehicleOfferRow::default());
        assert_eq!(
            fields(&violations),
            vec![
                CanonicalField::OfferCode,
                CanonicalField::Year,
                CanonicalField::MileageKm,
                CanonicalField::KeyCount,
                CanonicalField::HasEncumbrance,
                CanonicalField::IsDeregistered,
                CanonicalField::DaysOnSale,
                CanonicalField::Price,
            ]
        );
    }

    #[test]
    fn test_raw_text_is_rejected_with_value_in_message() {
        let validator = DqValidator::default();
        let row = CanonicalVehicleOfferRow {
            key_count: FieldValue::RawText("два".to_string()),
            ..valid_row()
        };
        let violations = validator.validate_row(&row);
        assert_eq!(fields(&violations), vec![CanonicalField::KeyCount]);
        assert!(violations[0].message.contains("два"));
    }

    #[test]
    fn test_custom_year_range() {
        let validator = DqValidator::new(2000, 2030);
        let row = CanonicalVehicleOfferRow {
            year: Some(1995),
            ..valid_row()
        };
        assert_eq!(fields(&validator.validate_row(&row)), vec![CanonicalField::Year]);
    }
}
