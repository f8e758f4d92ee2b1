//! Ordered strategy fallback.

use tracing::{debug, info, warn};

use super::ExtractionStrategy;
use crate::error::AllStrategiesFailed;
use crate::fields::FieldKey;
use crate::models::document::Document;
use crate::models::record::{RawFieldMap, StrategyId};
use crate::registry::FieldMapping;

/// Runs strategies in order and accepts the first map that covers the
/// minimal key set. Maps are taken wholesale; output never mixes fields
/// captured by different strategies.
#[derive(Debug, Clone)]
pub struct StrategyCoordinator {
    required: Vec<FieldKey>,
}

impl Default for StrategyCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyCoordinator {
    /// Coordinator requiring the fine number, the one field every layout
    /// carries and that downstream systems key on.
    pub fn new() -> Self {
        Self {
            required: vec![FieldKey::FineNumber],
        }
    }

    /// Coordinator with an explicit minimal key set.
    pub fn with_required(required: Vec<FieldKey>) -> Self {
        Self { required }
    }

    fn is_sufficient(&self, map: &RawFieldMap) -> bool {
        self.required.iter().all(|key| map.contains(*key))
    }

    /// Run the strategies in order against one document.
    ///
    /// Returns the first sufficient map along with the strategy that
    /// produced it. On failure the error carries every strategy tried and
    /// the insufficient map from the last strategy that produced one, for
    /// diagnostics.
    pub fn extract(
        &self,
        document: &Document,
        mapping: &FieldMapping,
        strategies: &[Box<dyn ExtractionStrategy>],
    ) -> Result<(RawFieldMap, StrategyId), AllStrategiesFailed> {
        let mut tried = Vec::with_capacity(strategies.len());
        let mut partial: Option<RawFieldMap> = None;

        for strategy in strategies {
            let id = strategy.id();
            tried.push(id);

            match strategy.attempt(document, mapping) {
                Ok(map) if self.is_sufficient(&map) => {
                    info!(strategy = %id, fields = map.len(), "extraction succeeded");
                    return Ok((map, id));
                }
                Ok(map) => {
                    debug!(strategy = %id, fields = map.len(), "map lacks required fields");
                    // The error reports the last strategy's best effort.
                    partial = Some(map);
                }
                Err(_) => {
                    debug!(strategy = %id, "strategy missed");
                }
            }
        }

        warn!(tried = ?tried, "all extraction strategies failed");
        Err(AllStrategiesFailed { partial, tried })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::extract::{default_strategies, StrategyMiss, StructuredStrategy};
    use crate::registry::{FieldMapping, FieldMappingRegistry};

    fn brazil() -> std::sync::Arc<FieldMapping> {
        FieldMappingRegistry::builtin().get_mapping("brazil").unwrap()
    }

    struct Counting<S> {
        inner: S,
        calls: Rc<Cell<usize>>,
    }

    impl<S: ExtractionStrategy> ExtractionStrategy for Counting<S> {
        fn id(&self) -> StrategyId {
            self.inner.id()
        }

        fn attempt(
            &self,
            document: &Document,
            mapping: &FieldMapping,
        ) -> Result<RawFieldMap, StrategyMiss> {
            self.calls.set(self.calls.get() + 1);
            self.inner.attempt(document, mapping)
        }
    }

    struct Fixed {
        id: StrategyId,
        map: Option<RawFieldMap>,
    }

    impl ExtractionStrategy for Fixed {
        fn id(&self) -> StrategyId {
            self.id
        }

        fn attempt(
            &self,
            _document: &Document,
            _mapping: &FieldMapping,
        ) -> Result<RawFieldMap, StrategyMiss> {
            self.map.clone().ok_or(StrategyMiss)
        }
    }

    #[test]
    fn test_later_strategies_not_invoked_after_success() {
        let doc = Document::from_text(
            "IDENTIFICAÇÃO DO AUTO DE INFRAÇÃO (Número do AIT)\nAB123456",
        );
        let regex_calls = Rc::new(Cell::new(0));
        let table_calls = Rc::new(Cell::new(0));
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(StructuredStrategy::new()),
            Box::new(Counting {
                inner: crate::extract::RegexStrategy::new(),
                calls: Rc::clone(&regex_calls),
            }),
            Box::new(Counting {
                inner: crate::extract::TableStrategy::new(),
                calls: Rc::clone(&table_calls),
            }),
        ];

        let (map, id) = StrategyCoordinator::new()
            .extract(&doc, &brazil(), &strategies)
            .unwrap();

        assert_eq!(id, StrategyId::Structured);
        assert_eq!(map.get(FieldKey::FineNumber), Some("AB123456"));
        assert_eq!(regex_calls.get(), 0);
        assert_eq!(table_calls.get(), 0);
    }

    #[test]
    fn test_falls_through_insufficient_map() {
        // Structured finds the plate but not the fine number; regex finds
        // both from the inline layout.
        let doc = Document::from_text(
            "PLACA: ABC1234\n\
             Nº do AIT: XY998877",
        );
        let (map, id) = StrategyCoordinator::new()
            .extract(&doc, &brazil(), &default_strategies())
            .unwrap();

        assert_eq!(id, StrategyId::Regex);
        assert!(map.contains(FieldKey::FineNumber));
    }

    #[test]
    fn test_failure_reports_tried_and_partial() {
        let mut insufficient = RawFieldMap::new(StrategyId::Regex);
        insufficient.insert(FieldKey::LicensePlate, "ABC1234", None, None);
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(Fixed {
                id: StrategyId::Structured,
                map: None,
            }),
            Box::new(Fixed {
                id: StrategyId::Regex,
                map: Some(insufficient),
            }),
        ];

        let doc = Document::from_text("irrelevant");
        let err = StrategyCoordinator::new()
            .extract(&doc, &brazil(), &strategies)
            .unwrap_err();

        assert_eq!(err.tried, vec![StrategyId::Structured, StrategyId::Regex]);
        let partial = err.partial.unwrap();
        assert_eq!(partial.get(FieldKey::LicensePlate), Some("ABC1234"));
    }

    #[test]
    fn test_partial_comes_from_last_strategy() {
        // An earlier strategy finds more fields, but the reported partial
        // is still the one from the last strategy that produced a map.
        let mut first = RawFieldMap::new(StrategyId::Structured);
        first.insert(FieldKey::LicensePlate, "ABC1234", None, None);
        first.insert(FieldKey::Amount, "R$ 195,23", None, None);
        let mut last = RawFieldMap::new(StrategyId::Table);
        last.insert(FieldKey::ViolationDate, "10/03/2024", None, None);

        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(Fixed {
                id: StrategyId::Structured,
                map: Some(first),
            }),
            Box::new(Fixed {
                id: StrategyId::Table,
                map: Some(last),
            }),
        ];

        let doc = Document::from_text("irrelevant");
        let err = StrategyCoordinator::new()
            .extract(&doc, &brazil(), &strategies)
            .unwrap_err();

        let partial = err.partial.unwrap();
        assert_eq!(partial.strategy(), StrategyId::Table);
        assert_eq!(partial.get(FieldKey::ViolationDate), Some("10/03/2024"));
        assert!(!partial.contains(FieldKey::LicensePlate));
    }

    #[test]
    fn test_custom_required_keys() {
        let mut map = RawFieldMap::new(StrategyId::Structured);
        map.insert(FieldKey::FineNumber, "AB123456", None, None);
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![Box::new(Fixed {
            id: StrategyId::Structured,
            map: Some(map),
        })];

        let coordinator = StrategyCoordinator::with_required(vec![
            FieldKey::FineNumber,
            FieldKey::LicensePlate,
        ]);
        let doc = Document::from_text("irrelevant");
        assert!(coordinator.extract(&doc, &brazil(), &strategies).is_err());
    }
}
