//! Table strategy: label cells paired with adjacent value cells, with a
//! separator-split fallback for pages without explicit tables.

use tracing::debug;

use super::{ExtractionStrategy, StrategyMiss};
use crate::models::document::{Document, Table};
use crate::models::record::{RawFieldMap, StrategyId};
use crate::registry::FieldMapping;

/// Last strategy in the default chain. Works off cell adjacency when the
/// document carries tables, otherwise splits lines on common column
/// separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableStrategy;

impl TableStrategy {
    pub fn new() -> Self {
        Self
    }

    fn scan_table(
        &self,
        table: &Table,
        table_idx: usize,
        mapping: &FieldMapping,
        map: &mut RawFieldMap,
    ) {
        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let Some(key) = mapping.match_cell(cell) else {
                    continue;
                };
                if map.contains(key) {
                    continue;
                }
                // Value lives in the cell to the right, or failing that the
                // cell directly below.
                let right = row.get(col_idx + 1).map(String::as_str);
                let below = table
                    .rows
                    .get(row_idx + 1)
                    .and_then(|r| r.get(col_idx))
                    .map(String::as_str);
                let candidate = [right, below]
                    .into_iter()
                    .flatten()
                    .map(str::trim)
                    .find(|v| !v.is_empty() && mapping.match_cell(v).is_none());
                if let Some(value) = candidate {
                    map.insert(key, value, None, Some(table_idx));
                }
            }
        }
    }

    fn scan_lines(&self, document: &Document, mapping: &FieldMapping, map: &mut RawFieldMap) {
        for (page_idx, page) in document.pages.iter().enumerate() {
            for line in page.lines() {
                let mut parts = line
                    .split(['|', '\t', ':'])
                    .map(str::trim)
                    .filter(|p| !p.is_empty());
                let Some(first) = parts.next() else { continue };
                let Some(key) = mapping.match_cell(first) else {
                    continue;
                };
                if let Some(value) = parts.find(|v| mapping.match_cell(v).is_none()) {
                    map.insert(key, value, Some(page_idx), None);
                }
            }
        }
    }
}

impl ExtractionStrategy for TableStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::Table
    }

    fn attempt(
        &self,
        document: &Document,
        mapping: &FieldMapping,
    ) -> Result<RawFieldMap, StrategyMiss> {
        let mut map = RawFieldMap::new(self.id());

        if document.has_tables() {
            for (table_idx, table) in document.tables.iter().enumerate() {
                self.scan_table(table, table_idx, mapping, &mut map);
            }
        } else {
            self.scan_lines(document, mapping, &mut map);
        }

        debug!(fields = map.len(), "table strategy attempt finished");
        if map.is_empty() {
            Err(StrategyMiss)
        } else {
            Ok(map)
        }
    }
}
