//! Conversion of raw string captures into typed field values.
//!
//! Each field is normalized independently: a value that fails to parse is
//! left out of the record (the validator reports it as missing), never
//! truncated or guessed at.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::fields::{FieldKey, FieldKind};
use crate::models::record::{CanonicalRecord, FieldValue, RawFieldMap};
use crate::registry::FieldMapping;
use crate::validate::{rule, Finding};

lazy_static! {
    // Day/month/year with two- or four-digit year; this fixed order is the
    // only locale handling the pipeline does.
    static ref DATE_DMY: Regex =
        Regex::new(r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b").unwrap();
}

/// Builds a [`CanonicalRecord`] from a raw field map.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize every captured field. The mapping is used only to flag
    /// captures that look like another label (cascading mis-captures).
    pub fn normalize(&self, raw: &RawFieldMap, mapping: &FieldMapping) -> CanonicalRecord {
        let mut fields = BTreeMap::new();
        let mut warnings = Vec::new();

        for (key, capture) in raw.iter() {
            if let Some(label) = mapping.label_inside(&capture.value, key) {
                warnings.push(Finding::new(
                    rule::NORMALIZE_LABEL_CAPTURE,
                    Some(key),
                    format!(
                        "captured value for '{key}' contains mapped label '{label}': {}",
                        capture.value
                    ),
                ));
            }

            let value = match key.kind() {
                FieldKind::Date => match parse_date(&capture.value) {
                    Some(date) => FieldValue::Date(date),
                    None => {
                        warn!(field = %key, value = %capture.value, "unparseable date dropped");
                        continue;
                    }
                },
                FieldKind::Amount => match parse_brl_amount(&capture.value) {
                    Some(amount) => FieldValue::Amount(amount),
                    None => {
                        warn!(field = %key, value = %capture.value, "unparseable amount dropped");
                        continue;
                    }
                },
                FieldKind::Identifier => FieldValue::Text(capture.value.to_uppercase()),
                FieldKind::Text => FieldValue::Text(capture.value.clone()),
            };
            fields.insert(key, value);
        }

        debug!(
            fields = fields.len(),
            warnings = warnings.len(),
            "raw field map normalized"
        );
        CanonicalRecord::new(fields, warnings)
    }
}

/// Parse the first `day/month/year` date in a string.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_DMY.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year = expand_year(caps[3].parse().ok()?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years pivot at 50: 00-50 are 2000s, 51-99 are 1900s.
fn expand_year(year: i32) -> i32 {
    if year < 100 {
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

/// Parse a Brazilian-formatted currency amount (e.g. "R$ 1.234,56").
///
/// With both separators present, `.` is the thousands separator and `,` the
/// decimal separator; a single separator of either kind is decimal. Repeated
/// `.` with no comma is treated as thousands grouping. Anything else in the
/// numeric remainder rejects the value.
pub fn parse_brl_amount(text: &str) -> Option<Decimal> {
    let mut s = text.trim();
    if let Some(prefix) = s.get(..2) {
        if prefix.eq_ignore_ascii_case("r$") {
            s = s[2..].trim();
        }
    }

    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, s),
    };

    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let dots = s.matches('.').count();
    let commas = s.matches(',').count();

    let normalized = match (dots, commas) {
        (_, 0) if dots <= 1 => s.to_string(),
        (_, 0) => s.replace('.', ""),
        (0, 1) => s.replace(',', "."),
        (_, 1) => s.replace('.', "").replace(',', "."),
        _ => return None,
    };

    let amount: Decimal = normalized.parse().ok()?;
    Some(if negative { -amount } else { amount })
}
