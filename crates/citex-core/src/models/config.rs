//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::models::record::StrategyId;
use crate::validate::{ValidationConfig, ValidationMode};

/// Main configuration for the citex pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitexConfig {
    /// Jurisdiction whose field mapping to use.
    pub jurisdiction: String,

    /// Validation enforcement mode.
    pub mode: ValidationMode,

    /// Extraction strategies, in fallback order.
    pub strategy_order: Vec<StrategyId>,

    /// Range-rule bounds.
    pub validation: ValidationConfig,
}

impl Default for CitexConfig {
    fn default() -> Self {
        Self {
            jurisdiction: "brazil".to_string(),
            mode: ValidationMode::default(),
            strategy_order: vec![StrategyId::Structured, StrategyId::Regex, StrategyId::Table],
            validation: ValidationConfig::default(),
        }
    }
}

impl CitexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
