//! Error types for the citex-core library.

use thiserror::Error;

use crate::fields::FieldKey;
use crate::models::record::{RawFieldMap, StrategyId};

/// Main error type for the citex library.
#[derive(Error, Debug)]
pub enum CitexError {
    /// Bad mapping source or pipeline configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The caller asked for a jurisdiction the registry does not know.
    #[error("unknown jurisdiction: {0}")]
    UnknownJurisdiction(String),

    /// No strategy produced a usable field map for the document.
    #[error(transparent)]
    Extraction(#[from] AllStrategiesFailed),
}

/// Errors raised while loading a jurisdiction mapping source.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the mapping source.
    #[error("failed to read mapping source: {0}")]
    Io(#[from] std::io::Error),

    /// The mapping source is not well-formed JSON of the expected shape.
    #[error("malformed mapping source: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The mapping source defines no jurisdictions at all.
    #[error("mapping source defines no jurisdictions")]
    NoJurisdictions,

    /// A jurisdiction entry exists but carries no label rules.
    #[error("jurisdiction '{0}' has no field mappings")]
    EmptyJurisdiction(String),

    /// The same raw label maps to two different canonical keys. Silently
    /// picking one is a correctness risk, so this is a hard error.
    #[error("jurisdiction '{jurisdiction}': label '{label}' maps to both '{first}' and '{second}'")]
    ConflictingLabel {
        jurisdiction: String,
        label: String,
        first: FieldKey,
        second: FieldKey,
    },
}

/// Every strategy either missed or produced an insufficient field map.
///
/// Carries the best-effort partial map for operator diagnostics; callers may
/// still surface it as an unparsed document for manual follow-up.
#[derive(Error, Debug)]
#[error("no strategy produced a usable field map (tried {tried:?})")]
pub struct AllStrategiesFailed {
    /// Insufficient map from the last strategy that produced one, if any.
    pub partial: Option<RawFieldMap>,
    /// Strategies invoked, in order.
    pub tried: Vec<StrategyId>,
}

/// Result type for the citex library.
pub type Result<T> = std::result::Result<T, CitexError>;
