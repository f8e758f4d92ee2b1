//! Structured layout strategy: a mapped label starts a line and its value is
//! the same-line remainder or the next non-blank line.

use tracing::debug;

use super::{ExtractionStrategy, StrategyMiss};
use crate::fields::FieldKey;
use crate::models::document::Document;
use crate::models::record::{RawFieldMap, StrategyId};
use crate::registry::FieldMapping;

/// Fast line-oriented strategy. Brittle to layout drift; first in the
/// default chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredStrategy;

impl StructuredStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionStrategy for StructuredStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::Structured
    }

    fn attempt(
        &self,
        document: &Document,
        mapping: &FieldMapping,
    ) -> Result<RawFieldMap, StrategyMiss> {
        let mut map = RawFieldMap::new(self.id());

        for (page_idx, page) in document.pages.iter().enumerate() {
            // The value for the most recent label still waiting for one.
            let mut pending: Option<FieldKey> = None;

            for line in page.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if let Some((rule, label_len)) = mapping.match_prefix(line) {
                    let remainder = line[label_len..]
                        .trim_start_matches([':', '-', ' ', '\t'])
                        .trim();
                    if !remainder.is_empty() {
                        map.insert(rule.key, remainder, Some(page_idx), None);
                        pending = None;
                    } else if !map.contains(rule.key) {
                        pending = Some(rule.key);
                    } else {
                        pending = None;
                    }
                } else if let Some(key) = pending.take() {
                    map.insert(key, line, Some(page_idx), None);
                }
            }
        }

        debug!(fields = map.len(), "structured strategy attempt finished");
        if map.is_empty() {
            Err(StrategyMiss)
        } else {
            Ok(map)
        }
    }
}
