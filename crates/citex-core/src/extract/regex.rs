//! Regex strategy: labeled-value patterns built from the configured mapping
//! plus built-in Portuguese synonyms.

use tracing::debug;

use super::patterns;
use super::{ExtractionStrategy, StrategyMiss};
use crate::fields::FieldKey;
use crate::models::document::Document;
use crate::models::record::{RawFieldMap, StrategyId};
use crate::registry::FieldMapping;

/// Pattern-based fallback for layouts where labels and values share lines or
/// drift from the configured wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexStrategy;

impl RegexStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionStrategy for RegexStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::Regex
    }

    fn attempt(
        &self,
        document: &Document,
        mapping: &FieldMapping,
    ) -> Result<RawFieldMap, StrategyMiss> {
        let mut map = RawFieldMap::new(self.id());

        for (page_idx, page) in document.pages.iter().enumerate() {
            // Configured labels take precedence over the synonym table.
            for rule in mapping.rules() {
                if map.contains(rule.key) {
                    continue;
                }
                let re = patterns::labeled_value_pattern(&rule.label);
                if let Some(caps) = re.captures(page) {
                    map.insert(rule.key, &caps[1], Some(page_idx), None);
                }
            }

            for key in FieldKey::ALL {
                if map.contains(key) {
                    continue;
                }
                for synonym in patterns::synonyms(key) {
                    let re = patterns::labeled_value_pattern(synonym);
                    if let Some(caps) = re.captures(page) {
                        map.insert(key, &caps[1], Some(page_idx), None);
                        break;
                    }
                }
            }
        }

        debug!(fields = map.len(), "regex strategy attempt finished");
        if map.is_empty() {
            Err(StrategyMiss)
        } else {
            Ok(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldMappingRegistry;

    fn brazil() -> std::sync::Arc<FieldMapping> {
        FieldMappingRegistry::builtin().get_mapping("brazil").unwrap()
    }

    #[test]
    fn test_inline_labeled_values() {
        let doc = Document::from_text(
            "Auto de Infração: AB123456  Placa: ABC1D23\n\
             Data da Infração: 10/03/2024  Valor da Multa: R$ 293,47",
        );
        let map = RegexStrategy::new().attempt(&doc, &brazil()).unwrap();

        assert_eq!(map.get(FieldKey::FineNumber).map(str::trim), Some("AB123456"));
        assert!(map.get(FieldKey::LicensePlate).unwrap().contains("ABC1D23"));
        assert!(map.get(FieldKey::Amount).unwrap().contains("R$ 293,47"));
    }

    #[test]
    fn test_synonym_labels_match() {
        // Reworded labels absent from the configured mapping.
        let doc = Document::from_text(
            "Nº do AIT: XY998877\n\
             Placa do veículo: DEF5678\n\
             Velocidade medida: 72 km/h",
        );
        let map = RegexStrategy::new().attempt(&doc, &brazil()).unwrap();

        assert!(map.get(FieldKey::FineNumber).unwrap().contains("XY998877"));
        assert!(map.get(FieldKey::LicensePlate).unwrap().contains("DEF5678"));
        assert!(map.get(FieldKey::MeasuredSpeed).unwrap().contains("72"));
    }

    #[test]
    fn test_configured_label_beats_synonym() {
        // "VALOR DA MULTA" is both a configured label and a synonym; the
        // configured pass runs first so only one capture lands.
        let doc = Document::from_text("VALOR DA MULTA: R$ 130,16");
        let map = RegexStrategy::new().attempt(&doc, &brazil()).unwrap();

        assert!(map.get(FieldKey::Amount).unwrap().contains("130,16"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_miss_on_plain_prose() {
        let doc = Document::from_text("este documento não contém rótulos conhecidos");
        assert_eq!(
            RegexStrategy::new().attempt(&doc, &brazil()).unwrap_err(),
            StrategyMiss
        );
    }
}
