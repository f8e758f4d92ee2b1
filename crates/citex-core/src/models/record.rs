//! Field map and record types produced by the extraction pipeline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fields::FieldKey;
use crate::validate::Finding;

/// Identifies which extraction strategy produced a field map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Label-on-one-line, value-on-the-next layout scan.
    Structured,
    /// Label-synonym regex matching over page text.
    Regex,
    /// Cell-adjacency scan over decoded tables.
    Table,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Structured => "structured",
            StrategyId::Regex => "regex",
            StrategyId::Table => "table",
        }
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw string value with source provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCapture {
    /// Trimmed, non-empty raw value.
    pub value: String,

    /// Zero-based page index the value was found on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    /// Zero-based table index, for table captures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<usize>,
}

/// Untyped field map produced by a single strategy attempt.
///
/// Values are always trimmed, non-empty strings; an absent key means the
/// strategy found nothing for it. A key is never overwritten once set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawFieldMap {
    strategy: StrategyId,
    values: BTreeMap<FieldKey, FieldCapture>,
}

impl RawFieldMap {
    pub fn new(strategy: StrategyId) -> Self {
        Self {
            strategy,
            values: BTreeMap::new(),
        }
    }

    /// Strategy that produced this map.
    pub fn strategy(&self) -> StrategyId {
        self.strategy
    }

    /// Insert a captured value. The value is trimmed; empty values and
    /// already-set keys are ignored. Returns whether the value was stored.
    pub fn insert(
        &mut self,
        key: FieldKey,
        value: &str,
        page: Option<usize>,
        table: Option<usize>,
    ) -> bool {
        let value = value.trim();
        if value.is_empty() || self.values.contains_key(&key) {
            return false;
        }
        self.values.insert(
            key,
            FieldCapture {
                value: value.to_string(),
                page,
                table,
            },
        );
        true
    }

    /// Raw value for a key, if captured.
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.values.get(&key).map(|c| c.value.as_str())
    }

    /// Full capture (value + provenance) for a key.
    pub fn capture(&self, key: FieldKey) -> Option<&FieldCapture> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate captures in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldCapture)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

/// A typed field value on a canonical record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Date(NaiveDate),
    Amount(Decimal),
    Text(String),
}

impl FieldValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Typed citation record built by the normalizer. Immutable once built.
///
/// A key whose raw value failed normalization is simply absent; the
/// validator reports it as missing or invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    fields: BTreeMap<FieldKey, FieldValue>,

    /// Whether all of [`FieldKey::REQUIRED`] are present.
    required_present: bool,

    /// Normalization warnings (e.g. a value that looks like another label).
    /// Carried into the verdict as warnings in both modes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<Finding>,
}

impl CanonicalRecord {
    pub(crate) fn new(fields: BTreeMap<FieldKey, FieldValue>, warnings: Vec<Finding>) -> Self {
        let required_present = FieldKey::REQUIRED.iter().all(|k| fields.contains_key(k));
        Self {
            fields,
            required_present,
            warnings,
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields.get(&key)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    pub fn date(&self, key: FieldKey) -> Option<NaiveDate> {
        self.fields.get(&key).and_then(FieldValue::as_date)
    }

    /// The fine amount, when present and numeric.
    pub fn amount(&self) -> Option<Decimal> {
        self.fields
            .get(&FieldKey::Amount)
            .and_then(FieldValue::as_amount)
    }

    pub fn text(&self, key: FieldKey) -> Option<&str> {
        self.fields.get(&key).and_then(FieldValue::as_text)
    }

    /// Whether all required fields survived normalization.
    pub fn required_present(&self) -> bool {
        self.required_present
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}
