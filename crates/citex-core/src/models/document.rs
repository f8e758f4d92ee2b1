//! Decoded document input for the extraction pipeline.
//!
//! Document decoding (PDF, scans) is the caller's responsibility; the
//! pipeline only ever sees page-ordered text and, where the decoder exposes
//! it, tabular cell data.

use serde::{Deserialize, Serialize};

/// A decoded citation document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Page text, in page order.
    #[serde(default)]
    pub pages: Vec<String>,

    /// Extracted tables, in document order. Empty when the decoder exposes
    /// no table structure.
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// A table extracted by the document decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows of cell strings, in reading order.
    pub rows: Vec<Vec<String>>,
}

impl Document {
    /// Build a single-page document from plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            pages: vec![text.into()],
            tables: Vec::new(),
        }
    }

    /// Build a document from page texts.
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self {
            pages,
            tables: Vec::new(),
        }
    }

    /// Attach decoded tables.
    pub fn with_tables(mut self, tables: Vec<Table>) -> Self {
        self.tables = tables;
        self
    }

    /// Whether the decoder exposed any table structure.
    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    /// Whether the document carries any non-blank text.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}
