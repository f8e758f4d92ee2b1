//! Data models for documents, records and configuration.

pub mod config;
pub mod document;
pub mod record;

pub use config::CitexConfig;
pub use document::{Document, Table};
pub use record::{CanonicalRecord, FieldCapture, FieldValue, RawFieldMap, StrategyId};
