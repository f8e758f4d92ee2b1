//! End-to-end extraction pipeline.
//!
//! Wires the registry, strategy coordinator, normalizer and validator into a
//! single run over one document. The pipeline is deterministic: the same
//! document, mapping and configuration always produce the same outcome.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::extract::{self, ExtractionStrategy, StrategyCoordinator};
use crate::models::config::CitexConfig;
use crate::models::document::Document;
use crate::models::record::{CanonicalRecord, StrategyId};
use crate::normalize::Normalizer;
use crate::registry::FieldMappingRegistry;
use crate::validate::{ValidationMode, ValidationVerdict, Validator};

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    /// Jurisdiction whose mapping was applied.
    pub jurisdiction: String,

    /// Strategy that produced the accepted field map.
    pub strategy: StrategyId,

    /// Typed record built from the accepted map.
    pub record: CanonicalRecord,

    /// Validation verdict for the record.
    pub verdict: ValidationVerdict,
}

/// The citation extraction pipeline.
pub struct CitationPipeline {
    registry: Arc<FieldMappingRegistry>,
    coordinator: StrategyCoordinator,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    normalizer: Normalizer,
    validator: Validator,
}

impl CitationPipeline {
    /// Pipeline with the built-in registry, default strategy chain and
    /// default validation bounds.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(FieldMappingRegistry::builtin()),
            coordinator: StrategyCoordinator::new(),
            strategies: extract::default_strategies(),
            normalizer: Normalizer::new(),
            validator: Validator::new(),
        }
    }

    /// Pipeline configured from a [`CitexConfig`], with the built-in
    /// registry.
    pub fn from_config(config: &CitexConfig) -> Self {
        Self::new()
            .with_strategies(extract::strategies_for(&config.strategy_order))
            .with_validator(Validator::new().with_config(config.validation.clone()))
    }

    pub fn with_registry(mut self, registry: Arc<FieldMappingRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_coordinator(mut self, coordinator: StrategyCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Jurisdictions the pipeline can run against.
    pub fn registry(&self) -> &FieldMappingRegistry {
        &self.registry
    }

    /// Run the full pipeline over one document.
    pub fn run(
        &self,
        document: &Document,
        jurisdiction: &str,
        mode: ValidationMode,
    ) -> Result<PipelineOutcome> {
        let mapping = self.registry.get_mapping(jurisdiction)?;

        let (raw, strategy) = self
            .coordinator
            .extract(document, &mapping, &self.strategies)?;
        let record = self.normalizer.normalize(&raw, &mapping);
        let verdict = self.validator.validate(&record, mode);

        info!(
            jurisdiction,
            strategy = %strategy,
            status = ?verdict.status,
            fields = record.len(),
            "pipeline run finished"
        );
        Ok(PipelineOutcome {
            jurisdiction: jurisdiction.to_string(),
            strategy,
            record,
            verdict,
        })
    }
}

impl Default for CitationPipeline {
    fn default() -> Self {
        Self::new()
    }
}
