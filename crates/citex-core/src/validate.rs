//! Validation layer for canonical citation records.
//!
//! Every rule is evaluated on every run; the verdict always carries the full
//! finding list. Required-field violations are errors in both modes; format,
//! range and cross-field violations are warnings in `Lenient` mode and
//! errors in `Strict` mode.

use chrono::{Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::FieldKey;
use crate::models::record::CanonicalRecord;

/// Stable rule identifiers surfaced on findings.
pub mod rule {
    pub const REQUIRED_FIELD: &str = "required-field";
    pub const FORMAT_FINE_NUMBER: &str = "format-fine-number";
    pub const FORMAT_LICENSE_PLATE: &str = "format-license-plate";
    pub const FORMAT_AMOUNT: &str = "format-amount";
    pub const FORMAT_OWNER_DOCUMENT: &str = "format-owner-document";
    pub const RANGE_AMOUNT: &str = "range-amount";
    pub const RANGE_VIOLATION_DATE: &str = "range-violation-date";
    pub const CROSS_FIELD_DATE_ORDER: &str = "cross-field-date-order";
    pub const CROSS_FIELD_SPEED_ORDER: &str = "cross-field-speed-order";
    pub const NORMALIZE_LABEL_CAPTURE: &str = "normalize-label-capture";
}

lazy_static! {
    // Brazilian plate formats: legacy ABC1234 and Mercosul ABC1D23.
    static ref PLATE_LEGACY: Regex = Regex::new(r"^[A-Z]{3}\d{4}$").unwrap();
    static ref PLATE_MERCOSUL: Regex = Regex::new(r"^[A-Z]{3}\d[A-Z]\d{2}$").unwrap();
    static ref FIRST_NUMBER: Regex = Regex::new(r"\d+").unwrap();
}

/// How strictly non-required rules are enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Format/range/cross-field violations become errors.
    Strict,
    /// Format/range/cross-field violations become warnings.
    #[default]
    Lenient,
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Rule identifier, one of the constants in [`rule`].
    pub rule: &'static str,
    /// Field the finding is about, when it concerns a single field.
    pub field: Option<FieldKey>,
    /// Human-readable explanation.
    pub message: String,
}

impl Finding {
    pub fn new(rule: &'static str, field: Option<FieldKey>, message: impl Into<String>) -> Self {
        Self {
            rule,
            field,
            message: message.into(),
        }
    }
}

/// Overall validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Accepted,
    AcceptedWithWarnings,
    Rejected,
}

/// Verdict for one canonical record. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub status: VerdictStatus,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationVerdict {
    fn from_findings(errors: Vec<Finding>, warnings: Vec<Finding>) -> Self {
        let status = if !errors.is_empty() {
            VerdictStatus::Rejected
        } else if !warnings.is_empty() {
            VerdictStatus::AcceptedWithWarnings
        } else {
            VerdictStatus::Accepted
        };
        Self {
            status,
            errors,
            warnings,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == VerdictStatus::Rejected
    }
}

/// Tunable bounds for range rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Lower bound of the plausible fine amount interval.
    pub amount_min: Decimal,

    /// Upper bound of the plausible fine amount interval.
    pub amount_max: Decimal,

    /// Violation dates older than this many years are out of range.
    pub max_age_years: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        // Brazilian fines typically run from ~R$ 50 to ~R$ 10 000.
        Self {
            amount_min: Decimal::new(50, 0),
            amount_max: Decimal::new(10_000, 0),
            max_age_years: 10,
        }
    }
}

/// Validates canonical records for format, range and logical consistency.
pub struct Validator {
    config: ValidationConfig,
    reference_date: NaiveDate,
}

impl Validator {
    /// Validator with default bounds, anchored at today's date.
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Anchor date-range rules at a fixed date (for reproducible tests).
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    /// Validate a record, producing a full finding list.
    pub fn validate(&self, record: &CanonicalRecord, mode: ValidationMode) -> ValidationVerdict {
        let mut errors = Vec::new();
        // Findings that escalate to errors only in strict mode.
        let mut graded = Vec::new();

        self.check_required(record, &mut errors);
        self.check_fine_number(record, &mut graded);
        self.check_license_plate(record, &mut graded);
        self.check_amount(record, &mut graded);
        self.check_owner_document(record, &mut graded);
        self.check_violation_date(record, &mut graded);
        self.check_date_order(record, &mut graded);
        self.check_speed_order(record, &mut graded);

        // Normalization warnings never escalate.
        let mut warnings: Vec<Finding> = record.warnings().to_vec();

        match mode {
            ValidationMode::Strict => errors.extend(graded),
            ValidationMode::Lenient => warnings.extend(graded),
        }

        let verdict = ValidationVerdict::from_findings(errors, warnings);
        debug!(
            status = ?verdict.status,
            errors = verdict.errors.len(),
            warnings = verdict.warnings.len(),
            "record validated"
        );
        verdict
    }

    fn check_required(&self, record: &CanonicalRecord, errors: &mut Vec<Finding>) {
        for key in FieldKey::REQUIRED {
            if !record.contains(key) {
                errors.push(Finding::new(
                    rule::REQUIRED_FIELD,
                    Some(key),
                    format!("required field '{key}' is missing"),
                ));
            }
        }
    }

    fn check_fine_number(&self, record: &CanonicalRecord, findings: &mut Vec<Finding>) {
        let Some(fine_number) = record.text(FieldKey::FineNumber) else {
            return;
        };
        let cleaned: String = fine_number
            .chars()
            .filter(|c| !matches!(c, '-' | '.' | ' '))
            .collect();

        if cleaned.chars().count() < 5 {
            findings.push(Finding::new(
                rule::FORMAT_FINE_NUMBER,
                Some(FieldKey::FineNumber),
                format!("fine number seems too short: {fine_number}"),
            ));
        }
        if !cleaned.chars().any(|c| c.is_ascii_digit()) {
            findings.push(Finding::new(
                rule::FORMAT_FINE_NUMBER,
                Some(FieldKey::FineNumber),
                format!("fine number contains no digits: {fine_number}"),
            ));
        }
    }

    fn check_license_plate(&self, record: &CanonicalRecord, findings: &mut Vec<Finding>) {
        let Some(plate) = record.text(FieldKey::LicensePlate) else {
            return;
        };
        let cleaned: String = plate.chars().filter(|c| !matches!(c, '-' | ' ')).collect();

        if !PLATE_LEGACY.is_match(&cleaned) && !PLATE_MERCOSUL.is_match(&cleaned) {
            findings.push(Finding::new(
                rule::FORMAT_LICENSE_PLATE,
                Some(FieldKey::LicensePlate),
                format!("license plate matches neither legacy nor Mercosul format: {plate}"),
            ));
        }
    }

    fn check_amount(&self, record: &CanonicalRecord, findings: &mut Vec<Finding>) {
        let Some(amount) = record.amount() else {
            return;
        };

        if amount < Decimal::ZERO {
            findings.push(Finding::new(
                rule::FORMAT_AMOUNT,
                Some(FieldKey::Amount),
                format!("amount cannot be negative: {amount}"),
            ));
        }

        if amount < self.config.amount_min {
            findings.push(Finding::new(
                rule::RANGE_AMOUNT,
                Some(FieldKey::Amount),
                format!(
                    "amount {amount} is below the plausible minimum {}",
                    self.config.amount_min
                ),
            ));
        } else if amount > self.config.amount_max {
            findings.push(Finding::new(
                rule::RANGE_AMOUNT,
                Some(FieldKey::Amount),
                format!(
                    "amount {amount} is above the plausible maximum {}",
                    self.config.amount_max
                ),
            ));
        }
    }

    fn check_owner_document(&self, record: &CanonicalRecord, findings: &mut Vec<Finding>) {
        let Some(document) = record.text(FieldKey::OwnerDocument) else {
            return;
        };
        let cleaned: String = document
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | '/' | ' '))
            .collect();

        if !cleaned.chars().all(|c| c.is_ascii_digit()) {
            findings.push(Finding::new(
                rule::FORMAT_OWNER_DOCUMENT,
                Some(FieldKey::OwnerDocument),
                format!("owner document contains non-digits: {document}"),
            ));
        } else if cleaned.len() != 11 && cleaned.len() != 14 {
            // CPF has 11 digits, CNPJ has 14.
            findings.push(Finding::new(
                rule::FORMAT_OWNER_DOCUMENT,
                Some(FieldKey::OwnerDocument),
                format!(
                    "owner document has {} digits, expected 11 (CPF) or 14 (CNPJ)",
                    cleaned.len()
                ),
            ));
        }
    }

    fn check_violation_date(&self, record: &CanonicalRecord, findings: &mut Vec<Finding>) {
        let Some(date) = record.date(FieldKey::ViolationDate) else {
            return;
        };

        if date > self.reference_date {
            findings.push(Finding::new(
                rule::RANGE_VIOLATION_DATE,
                Some(FieldKey::ViolationDate),
                format!("violation date is in the future: {date}"),
            ));
        }

        // A horizon outside chrono's representable range disables the
        // age rule rather than panicking on caller-supplied config.
        let horizon = self
            .reference_date
            .year()
            .checked_sub(self.config.max_age_years)
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
        if let Some(horizon) = horizon {
            if date < horizon {
                findings.push(Finding::new(
                    rule::RANGE_VIOLATION_DATE,
                    Some(FieldKey::ViolationDate),
                    format!(
                        "violation date is older than {} years: {date}",
                        self.config.max_age_years
                    ),
                ));
            }
        }
    }

    fn check_date_order(&self, record: &CanonicalRecord, findings: &mut Vec<Finding>) {
        let violation = record.date(FieldKey::ViolationDate);
        let notification = record.date(FieldKey::NotificationDate);
        let defense_due = record.date(FieldKey::DefenseDueDate);
        let driver_id_due = record.date(FieldKey::DriverIdDueDate);

        if let (Some(violation), Some(notification)) = (violation, notification) {
            if notification < violation {
                findings.push(Finding::new(
                    rule::CROSS_FIELD_DATE_ORDER,
                    Some(FieldKey::NotificationDate),
                    format!("notification date {notification} precedes violation date {violation}"),
                ));
            }
        }

        if let (Some(notification), Some(defense_due)) = (notification, defense_due) {
            if defense_due < notification {
                findings.push(Finding::new(
                    rule::CROSS_FIELD_DATE_ORDER,
                    Some(FieldKey::DefenseDueDate),
                    format!(
                        "defense due date {defense_due} precedes notification date {notification}"
                    ),
                ));
            }
        }

        if let (Some(notification), Some(driver_id_due)) = (notification, driver_id_due) {
            if driver_id_due < notification {
                findings.push(Finding::new(
                    rule::CROSS_FIELD_DATE_ORDER,
                    Some(FieldKey::DriverIdDueDate),
                    format!(
                        "driver id due date {driver_id_due} precedes notification date {notification}"
                    ),
                ));
            }
        }
    }

    fn check_speed_order(&self, record: &CanonicalRecord, findings: &mut Vec<Finding>) {
        let measured = record
            .text(FieldKey::MeasuredSpeed)
            .and_then(parse_speed_value);
        let considered = record
            .text(FieldKey::ConsideredSpeed)
            .and_then(parse_speed_value);

        if let (Some(measured), Some(considered)) = (measured, considered) {
            if measured < considered {
                findings.push(Finding::new(
                    rule::CROSS_FIELD_SPEED_ORDER,
                    Some(FieldKey::MeasuredSpeed),
                    format!(
                        "measured speed {measured} km/h is below considered speed {considered} km/h"
                    ),
                ));
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// First integer in a speed string like "87 km/h".
fn parse_speed_value(text: &str) -> Option<u32> {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::record::FieldValue;

    fn record(fields: Vec<(FieldKey, FieldValue)>) -> CanonicalRecord {
        CanonicalRecord::new(fields.into_iter().collect::<BTreeMap<_, _>>(), Vec::new())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn validator() -> Validator {
        Validator::new().with_reference_date(ymd(2025, 6, 1))
    }

    fn complete_record() -> Vec<(FieldKey, FieldValue)> {
        vec![
            (FieldKey::FineNumber, FieldValue::Text("AB123456".into())),
            (FieldKey::LicensePlate, FieldValue::Text("ABC1234".into())),
            (FieldKey::ViolationDate, FieldValue::Date(ymd(2025, 3, 10))),
            (FieldKey::Amount, FieldValue::Amount(Decimal::new(35000, 2))),
        ]
    }

    #[test]
    fn test_accepted_when_clean() {
        let verdict = validator().validate(&record(complete_record()), ValidationMode::Strict);
        assert_eq!(verdict.status, VerdictStatus::Accepted);
        assert!(verdict.errors.is_empty());
        assert!(verdict.warnings.is_empty());
    }

    #[test]
    fn test_missing_required_rejects_in_both_modes() {
        let rec = record(vec![(
            FieldKey::FineNumber,
            FieldValue::Text("AB123456".into()),
        )]);

        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let verdict = validator().validate(&rec, mode);
            assert_eq!(verdict.status, VerdictStatus::Rejected);
            assert_eq!(
                verdict
                    .errors
                    .iter()
                    .filter(|f| f.rule == rule::REQUIRED_FIELD)
                    .count(),
                2,
                "license_plate and violation_date should both be reported"
            );
        }
    }

    #[test]
    fn test_negative_amount_is_format_finding() {
        let mut fields = complete_record();
        fields.retain(|(k, _)| *k != FieldKey::Amount);
        fields.push((FieldKey::Amount, FieldValue::Amount(Decimal::new(-5000, 2))));
        let rec = record(fields);

        let strict = validator().validate(&rec, ValidationMode::Strict);
        assert_eq!(strict.status, VerdictStatus::Rejected);
        assert!(strict.errors.iter().any(|f| f.rule == rule::FORMAT_AMOUNT));
        // Range rules are not short-circuited by the format finding.
        assert!(strict.errors.iter().any(|f| f.rule == rule::RANGE_AMOUNT));

        let lenient = validator().validate(&rec, ValidationMode::Lenient);
        assert_eq!(lenient.status, VerdictStatus::AcceptedWithWarnings);
        assert!(lenient.warnings.iter().any(|f| f.rule == rule::FORMAT_AMOUNT));
        assert!(lenient.warnings.iter().any(|f| f.rule == rule::RANGE_AMOUNT));
    }

    #[test]
    fn test_amount_out_of_range() {
        let mut fields = complete_record();
        fields.retain(|(k, _)| *k != FieldKey::Amount);
        fields.push((FieldKey::Amount, FieldValue::Amount(Decimal::new(12, 0))));

        let verdict = validator().validate(&record(fields), ValidationMode::Lenient);
        assert_eq!(verdict.status, VerdictStatus::AcceptedWithWarnings);
        assert!(verdict.warnings.iter().any(|f| f.rule == rule::RANGE_AMOUNT));
    }

    #[test]
    fn test_plate_formats() {
        for plate in ["ABC1234", "ABC1D23", "ABC-1234"] {
            let mut fields = complete_record();
            fields.retain(|(k, _)| *k != FieldKey::LicensePlate);
            fields.push((FieldKey::LicensePlate, FieldValue::Text(plate.into())));
            let verdict = validator().validate(&record(fields), ValidationMode::Strict);
            assert_eq!(verdict.status, VerdictStatus::Accepted, "plate {plate}");
        }

        let mut fields = complete_record();
        fields.retain(|(k, _)| *k != FieldKey::LicensePlate);
        fields.push((FieldKey::LicensePlate, FieldValue::Text("1234ABC".into())));
        let verdict = validator().validate(&record(fields), ValidationMode::Strict);
        assert!(verdict.errors.iter().any(|f| f.rule == rule::FORMAT_LICENSE_PLATE));
    }

    #[test]
    fn test_future_violation_date() {
        let mut fields = complete_record();
        fields.retain(|(k, _)| *k != FieldKey::ViolationDate);
        fields.push((FieldKey::ViolationDate, FieldValue::Date(ymd(2026, 1, 1))));

        let verdict = validator().validate(&record(fields), ValidationMode::Strict);
        assert!(verdict.errors.iter().any(|f| f.rule == rule::RANGE_VIOLATION_DATE));
    }

    #[test]
    fn test_violation_date_older_than_horizon() {
        let mut fields = complete_record();
        fields.retain(|(k, _)| *k != FieldKey::ViolationDate);
        fields.push((FieldKey::ViolationDate, FieldValue::Date(ymd(2001, 1, 1))));

        let verdict = validator().validate(&record(fields), ValidationMode::Strict);
        assert!(verdict.errors.iter().any(|f| f.rule == rule::RANGE_VIOLATION_DATE));
    }

    #[test]
    fn test_extreme_age_horizon_disables_rule() {
        // An unrepresentable horizon must not panic; the age rule is
        // simply skipped.
        let config = ValidationConfig {
            max_age_years: i32::MAX,
            ..ValidationConfig::default()
        };
        let validator = Validator::new()
            .with_config(config)
            .with_reference_date(ymd(2025, 6, 1));

        let mut fields = complete_record();
        fields.retain(|(k, _)| *k != FieldKey::ViolationDate);
        fields.push((FieldKey::ViolationDate, FieldValue::Date(ymd(2001, 1, 1))));

        let verdict = validator.validate(&record(fields), ValidationMode::Strict);
        assert!(verdict.errors.iter().all(|f| f.rule != rule::RANGE_VIOLATION_DATE));
    }

    #[test]
    fn test_date_order_rule_in_both_modes() {
        let mut fields = complete_record();
        // Notification before the violation itself.
        fields.push((FieldKey::NotificationDate, FieldValue::Date(ymd(2025, 2, 1))));
        let rec = record(fields);

        let lenient = validator().validate(&rec, ValidationMode::Lenient);
        assert!(
            lenient
                .warnings
                .iter()
                .any(|f| f.rule == rule::CROSS_FIELD_DATE_ORDER)
        );
        assert_eq!(lenient.status, VerdictStatus::AcceptedWithWarnings);

        let strict = validator().validate(&rec, ValidationMode::Strict);
        assert!(
            strict
                .errors
                .iter()
                .any(|f| f.rule == rule::CROSS_FIELD_DATE_ORDER)
        );
        assert_eq!(strict.status, VerdictStatus::Rejected);
    }

    #[test]
    fn test_defense_due_before_notification() {
        let mut fields = complete_record();
        fields.push((FieldKey::NotificationDate, FieldValue::Date(ymd(2025, 4, 1))));
        fields.push((FieldKey::DefenseDueDate, FieldValue::Date(ymd(2025, 3, 20))));

        let verdict = validator().validate(&record(fields), ValidationMode::Strict);
        assert!(
            verdict
                .errors
                .iter()
                .any(|f| f.rule == rule::CROSS_FIELD_DATE_ORDER
                    && f.field == Some(FieldKey::DefenseDueDate))
        );
    }

    #[test]
    fn test_speed_order() {
        let mut fields = complete_record();
        fields.push((FieldKey::MeasuredSpeed, FieldValue::Text("78 KM/H".into())));
        fields.push((FieldKey::ConsideredSpeed, FieldValue::Text("85 KM/H".into())));

        let verdict = validator().validate(&record(fields), ValidationMode::Lenient);
        assert!(
            verdict
                .warnings
                .iter()
                .any(|f| f.rule == rule::CROSS_FIELD_SPEED_ORDER)
        );
    }

    #[test]
    fn test_owner_document_lengths() {
        for (doc, ok) in [
            ("123.456.789-01", true),
            ("12.345.678/0001-90", true),
            ("12345", false),
        ] {
            let mut fields = complete_record();
            fields.push((FieldKey::OwnerDocument, FieldValue::Text(doc.into())));
            let verdict = validator().validate(&record(fields), ValidationMode::Strict);
            assert_eq!(
                !verdict
                    .errors
                    .iter()
                    .any(|f| f.rule == rule::FORMAT_OWNER_DOCUMENT),
                ok,
                "document {doc}"
            );
        }
    }

    #[test]
    fn test_normalization_warnings_never_escalate() {
        let rec = CanonicalRecord::new(
            complete_record().into_iter().collect(),
            vec![Finding::new(
                rule::NORMALIZE_LABEL_CAPTURE,
                Some(FieldKey::VehicleModel),
                "captured value contains mapped label 'PLACA'",
            )],
        );

        let strict = validator().validate(&rec, ValidationMode::Strict);
        assert_eq!(strict.status, VerdictStatus::AcceptedWithWarnings);
        assert!(strict.errors.is_empty());
    }
}
