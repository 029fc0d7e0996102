//! Engine configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides.

use crate::error::{EngineError, Result};
use hyurim_core::{DisabledEmbedder, EmbeddingProvider, HashingEmbedder, DEFAULT_EMBEDDING_DIM};
use hyurim_similarity::{ScoringWeights, DEFAULT_CAPACITY_SLACK};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Hashing,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Hashing,
            dimension: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl EmbeddingConfig {
    pub fn build_provider(&self) -> Arc<dyn EmbeddingProvider> {
        match self.provider {
            ProviderKind::Hashing => Arc::new(HashingEmbedder::new(self.dimension)),
            ProviderKind::Disabled => Arc::new(DisabledEmbedder::new("semantic search disabled by configuration")),
        }
    }
}

pub const DEFAULT_VECTOR_BUDGET_WEIGHT: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Candidates retrieved from the vector index per request
    pub top_k: usize,
    pub default_result_count: usize,
    pub max_result_count: usize,
    /// Cap on results from one forest; `None` disables diversity re-ranking
    pub max_per_forest: Option<usize>,
    pub capacity_slack: u32,
    pub weights: ScoringWeights,
    /// Share of a vector-path score given to budget proximity when a budget is set
    pub vector_budget_weight: f32,
    pub infer_capacity_from_query: bool,
    pub max_query_chars: usize,
    pub embedding: EmbeddingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 50,
            default_result_count: 5,
            max_result_count: 50,
            max_per_forest: None,
            capacity_slack: DEFAULT_CAPACITY_SLACK,
            weights: ScoringWeights::default(),
            vector_budget_weight: DEFAULT_VECTOR_BUDGET_WEIGHT,
            infer_capacity_from_query: true,
            max_query_chars: 1000,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(EngineError::InvalidConfig("top_k must be positive".to_string()));
        }
        if self.max_result_count == 0 {
            return Err(EngineError::InvalidConfig("max_result_count must be positive".to_string()));
        }
        if self.default_result_count == 0 || self.default_result_count > self.max_result_count {
            return Err(EngineError::InvalidConfig(format!(
                "default_result_count must be between 1 and {}",
                self.max_result_count
            )));
        }
        if self.max_per_forest == Some(0) {
            return Err(EngineError::InvalidConfig("max_per_forest must be positive when set".to_string()));
        }
        if self.embedding.provider == ProviderKind::Hashing && self.embedding.dimension == 0 {
            return Err(EngineError::InvalidConfig("embedding dimension must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.vector_budget_weight) {
            return Err(EngineError::InvalidConfig(
                "vector_budget_weight must be between 0 and 1".to_string(),
            ));
        }
        let mut weights = self.weights;
        weights.validate_and_normalize()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.top_k, 50);
        assert_eq!(config.default_result_count, 5);
        assert_eq!(config.max_per_forest, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"max_per_forest": 2, "embedding": {"provider": "disabled"}}"#,
        )
        .unwrap();
        assert_eq!(config.max_per_forest, Some(2));
        assert_eq!(config.embedding.provider, ProviderKind::Disabled);
        assert_eq!(config.embedding.dimension, DEFAULT_EMBEDDING_DIM);
        assert_eq!(config.top_k, 50);
        assert!(config.embedding.build_provider().check().is_err());
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = EngineConfig::default();
        config.default_result_count = 80;
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.weights = ScoringWeights::new(-1.0, 0.0, 0.0, 0.0);
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.max_per_forest = Some(0);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.vector_budget_weight = f32::NAN;
        assert!(config.validate().is_err());
        config.vector_budget_weight = 1.5;
        assert!(config.validate().is_err());
    }
}
