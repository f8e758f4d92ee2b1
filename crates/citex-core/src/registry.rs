//! Jurisdiction-configurable label-to-canonical-key mapping registry.
//!
//! The registry is loaded once at startup and is read-only afterwards;
//! mappings are handed out as `Arc`s so an in-flight pipeline run keeps its
//! mapping even if the caller switches jurisdictions for later runs.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CitexError, ConfigError};
use crate::fields::FieldKey;

/// Default mapping shipped with the crate (Brazilian federal layout).
const BUILTIN_MAPPINGS: &str = include_str!("field_mappings.json");

/// One raw label and the canonical key it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    /// Label text as it appears in documents. Case- and whitespace-sensitive
    /// for the structured strategy; other strategies match more loosely.
    pub label: String,
    /// Canonical key the label maps to.
    pub key: FieldKey,
}

/// Ordered label rules for one jurisdiction. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMapping {
    jurisdiction: String,
    rules: Vec<LabelRule>,
}

impl FieldMapping {
    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// Label rules in source order.
    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Longest label that the line starts with, with its byte length.
    ///
    /// Longest-match avoids a short label like `DATA` shadowing
    /// `DATA DA NOTIFICAÇÃO DA AUTUAÇÃO`.
    pub fn match_prefix(&self, line: &str) -> Option<(&LabelRule, usize)> {
        self.rules
            .iter()
            .filter(|r| line.starts_with(r.label.as_str()))
            .max_by_key(|r| r.label.len())
            .map(|r| (r, r.label.len()))
    }

    /// Label matching a table cell, case-insensitively and in either
    /// containment direction (cells are often truncated or padded).
    ///
    /// Candidates are ranked by overlap length so a bare `DATA` cell resolves
    /// to the `DATA` label while a truncated `DATA DA NOTIFICAÇÃO` cell still
    /// resolves to `DATA DA NOTIFICAÇÃO DA AUTUAÇÃO`.
    pub fn match_cell(&self, cell: &str) -> Option<FieldKey> {
        let cell = cell.trim().to_lowercase();
        if cell.len() < 4 {
            return None;
        }

        self.rules
            .iter()
            .filter_map(|r| {
                let label = r.label.to_lowercase();
                // Overlap length, with full-label matches winning ties
                // against truncations of the same length.
                if cell.contains(&label) {
                    Some((label.len() * 2, r.key))
                } else if label.contains(&cell) {
                    Some((cell.len() * 2 - 1, r.key))
                } else {
                    None
                }
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, key)| key)
    }

    /// First mapped label (other than the field's own) appearing inside a
    /// captured value. Used to flag cascading mis-captures.
    pub fn label_inside(&self, value: &str, own: FieldKey) -> Option<&str> {
        let value = value.to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.key != own && r.label.len() >= 4)
            .find(|r| value.contains(&r.label.to_lowercase()))
            .map(|r| r.label.as_str())
    }
}

/// Registry of per-jurisdiction field mappings.
#[derive(Debug, Clone)]
pub struct FieldMappingRegistry {
    mappings: HashMap<String, Arc<FieldMapping>>,
}

impl FieldMappingRegistry {
    /// Registry with the built-in Brazilian mapping.
    pub fn builtin() -> Self {
        Self::load_str(BUILTIN_MAPPINGS).expect("builtin field mappings are valid")
    }

    /// Load a registry from a JSON mapping source.
    ///
    /// Expected shape: `{ "<jurisdiction>": [ {"label": "...", "key": "..."} ] }`.
    /// Fails on malformed JSON, empty jurisdiction entries, and labels that
    /// map to conflicting canonical keys.
    pub fn load_str(source: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, Vec<LabelRule>> = serde_json::from_str(source)?;

        if raw.is_empty() {
            return Err(ConfigError::NoJurisdictions);
        }

        let mut mappings = HashMap::with_capacity(raw.len());
        for (jurisdiction, rules) in raw {
            if rules.is_empty() {
                return Err(ConfigError::EmptyJurisdiction(jurisdiction));
            }

            // Deduplicate identical pairs; conflicting pairs are fatal.
            let mut seen: HashMap<&str, FieldKey> = HashMap::new();
            let mut deduped: Vec<LabelRule> = Vec::with_capacity(rules.len());
            for rule in &rules {
                match seen.get(rule.label.as_str()) {
                    Some(key) if *key == rule.key => continue,
                    Some(key) => {
                        return Err(ConfigError::ConflictingLabel {
                            jurisdiction,
                            label: rule.label.clone(),
                            first: *key,
                            second: rule.key,
                        });
                    }
                    None => {
                        seen.insert(rule.label.as_str(), rule.key);
                        deduped.push(rule.clone());
                    }
                }
            }

            debug!(
                jurisdiction = %jurisdiction,
                rules = deduped.len(),
                "loaded field mapping"
            );
            mappings.insert(
                jurisdiction.clone(),
                Arc::new(FieldMapping {
                    jurisdiction,
                    rules: deduped,
                }),
            );
        }

        info!(jurisdictions = mappings.len(), "field mapping registry loaded");
        Ok(Self { mappings })
    }

    /// Load a registry from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::load_str(&source)
    }

    /// Mapping for a jurisdiction.
    pub fn get_mapping(&self, jurisdiction: &str) -> Result<Arc<FieldMapping>, CitexError> {
        self.mappings
            .get(jurisdiction)
            .cloned()
            .ok_or_else(|| CitexError::UnknownJurisdiction(jurisdiction.to_string()))
    }

    /// Names of all configured jurisdictions.
    pub fn list_jurisdictions(&self) -> BTreeSet<String> {
        self.mappings.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_brazil() {
        let registry = FieldMappingRegistry::builtin();
        let mapping = registry.get_mapping("brazil").unwrap();
        assert_eq!(mapping.jurisdiction(), "brazil");
        assert!(mapping.len() >= 15);
        assert!(registry.list_jurisdictions().contains("brazil"));
    }

    #[test]
    fn test_unknown_jurisdiction() {
        let registry = FieldMappingRegistry::builtin();
        let err = registry.get_mapping("atlantis").unwrap_err();
        assert!(matches!(err, CitexError::UnknownJurisdiction(j) if j == "atlantis"));
    }

    #[test]
    fn test_malformed_source() {
        let err = FieldMappingRegistry::load_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_empty_jurisdiction_is_error() {
        let err = FieldMappingRegistry::load_str(r#"{"brazil": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyJurisdiction(j) if j == "brazil"));
    }

    #[test]
    fn test_conflicting_label_is_error() {
        let source = r#"{
            "brazil": [
                {"label": "PLACA", "key": "license_plate"},
                {"label": "PLACA", "key": "fine_number"}
            ]
        }"#;
        let err = FieldMappingRegistry::load_str(source).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingLabel { label, .. } if label == "PLACA"));
    }

    #[test]
    fn test_duplicate_identical_label_is_deduped() {
        let source = r#"{
            "brazil": [
                {"label": "PLACA", "key": "license_plate"},
                {"label": "PLACA", "key": "license_plate"}
            ]
        }"#;
        let registry = FieldMappingRegistry::load_str(source).unwrap();
        assert_eq!(registry.get_mapping("brazil").unwrap().len(), 1);
    }

    #[test]
    fn test_match_prefix_prefers_longest_label() {
        let registry = FieldMappingRegistry::builtin();
        let mapping = registry.get_mapping("brazil").unwrap();

        let (rule, _) = mapping
            .match_prefix("DATA DA NOTIFICAÇÃO DA AUTUAÇÃO")
            .unwrap();
        assert_eq!(rule.key, FieldKey::NotificationDate);

        let (rule, len) = mapping.match_prefix("DATA").unwrap();
        assert_eq!(rule.key, FieldKey::ViolationDate);
        assert_eq!(len, 4);
    }

    #[test]
    fn test_match_cell_precedence() {
        let registry = FieldMappingRegistry::builtin();
        let mapping = registry.get_mapping("brazil").unwrap();

        // Exact label beats longer labels that merely contain it.
        assert_eq!(mapping.match_cell("DATA"), Some(FieldKey::ViolationDate));
        // Padded cell.
        assert_eq!(
            mapping.match_cell("  VALOR DA MULTA (R$)  "),
            Some(FieldKey::Amount)
        );
        // Truncated cell.
        assert_eq!(
            mapping.match_cell("DATA DA NOTIFICAÇÃO"),
            Some(FieldKey::NotificationDate)
        );
        assert_eq!(mapping.match_cell("ABC1234"), None);
    }

    #[test]
    fn test_label_inside_flags_other_labels_only() {
        let registry = FieldMappingRegistry::builtin();
        let mapping = registry.get_mapping("brazil").unwrap();

        assert!(
            mapping
                .label_inside("PLACA ABC1234", FieldKey::VehicleModel)
                .is_some()
        );
        assert!(mapping.label_inside("ABC1234", FieldKey::LicensePlate).is_none());
    }
}
