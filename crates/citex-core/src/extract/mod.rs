//! Extraction strategies and their coordinator.

mod coordinator;
pub mod patterns;
mod regex;
mod structured;
mod table;

pub use coordinator::StrategyCoordinator;
pub use self::regex::RegexStrategy;
pub use structured::StructuredStrategy;
pub use table::TableStrategy;

use crate::models::document::Document;
use crate::models::record::{RawFieldMap, StrategyId};
use crate::registry::FieldMapping;

/// Signal that a strategy found nothing useful in the document.
///
/// Not an error: a miss simply drives fallback to the next strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyMiss;

/// An independent extraction algorithm.
///
/// Strategies are stateless: given the same `(document, mapping)` input the
/// produced field map must be identical.
pub trait ExtractionStrategy {
    /// Identifier recorded as provenance on produced maps.
    fn id(&self) -> StrategyId;

    /// Attempt to fill a field map from the document.
    fn attempt(
        &self,
        document: &Document,
        mapping: &FieldMapping,
    ) -> Result<RawFieldMap, StrategyMiss>;
}

/// Default strategy chain: structured, then regex, then table.
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(StructuredStrategy::new()),
        Box::new(RegexStrategy::new()),
        Box::new(TableStrategy::new()),
    ]
}

/// Strategy chain in an explicit order.
pub fn strategies_for(order: &[StrategyId]) -> Vec<Box<dyn ExtractionStrategy>> {
    order
        .iter()
        .map(|id| -> Box<dyn ExtractionStrategy> {
            match id {
                StrategyId::Structured => Box::new(StructuredStrategy::new()),
                StrategyId::Regex => Box::new(RegexStrategy::new()),
                StrategyId::Table => Box::new(TableStrategy::new()),
            }
        })
        .collect()
}
