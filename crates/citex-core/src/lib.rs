//! Core library for extracting structured data from traffic citation
//! documents.
//!
//! The pipeline takes decoded document text (and tables, when the decoder
//! exposes them), runs an ordered chain of extraction strategies against a
//! jurisdiction's label mapping, normalizes the captured strings into typed
//! fields and validates the resulting record.
//!
//! ```no_run
//! use citex_core::models::Document;
//! use citex_core::pipeline::CitationPipeline;
//! use citex_core::validate::ValidationMode;
//!
//! # fn main() -> citex_core::Result<()> {
//! let document = Document::from_text("PLACA: ABC1234");
//! let pipeline = CitationPipeline::new();
//! let outcome = pipeline.run(&document, "brazil", ValidationMode::Lenient)?;
//! println!("{:?}", outcome.verdict.status);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod fields;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod registry;
pub mod validate;

pub use error::{CitexError, Result};
pub use fields::FieldKey;
pub use models::{CanonicalRecord, Document, RawFieldMap, StrategyId};
pub use pipeline::{CitationPipeline, PipelineOutcome};
pub use registry::FieldMappingRegistry;
pub use validate::{ValidationMode, ValidationVerdict, VerdictStatus};
