//! # Hyurim
//!
//! Lodging recommendations for recreational forests.
//!
//! A free-text query plus structured preferences (party size, budget,
//! region, stay period) and optional eligibility attributes go in; a ranked
//! list of facilities with discount-adjusted prices comes out.
//!
//! Requests are served by semantic search over facility embeddings when an
//! embedding provider and a built index are available. Otherwise a
//! deterministic attribute scorer takes over and the response is marked
//! `degraded`. Either way the best eligible discount policy is applied to
//! each result.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! hyurim --data-file ./data/catalog.json --http-port 8080 \
//!        --embedding-cache ./data/embeddings.bin
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use hyurim::prelude::*;
//! use std::sync::Arc;
//!
//! let repository = Arc::new(InMemoryRepository::new(Catalog::default()));
//! let engine = Recommender::with_repository(EngineConfig::default(), repository).unwrap();
//! engine.rebuild_index().unwrap();
//!
//! let request = RecommendationRequest::new("4-person family room").with_capacity(4);
//! let response = engine.recommend(&request).unwrap();
//! assert!(!response.degraded);
//! ```
//!
//! ## Crate Structure
//!
//! - `hyurim-core` - data model, embedding providers, embedding cache, vector index, repositories
//! - `hyurim-similarity` - fallback attribute scorer
//! - `hyurim-engine` - validation, path selection, ranking, relaxation, discounts
//! - `hyurim-storage` - catalog loading and the persisted embedding cache
//! - `hyurim-api` - REST API

// Re-export core types
pub use hyurim_core::{
    Catalog, DiscountPolicy, EligibilityCondition, EmbeddingCache, EmbeddingProvider, Error, FacilityId,
    FacilityRecord, ForestId, ForestRecord, HashingEmbedder, InMemoryRepository, PolicyId, Result, StayPeriod,
    UserAttributes, Vector, VectorIndex,
};

pub use hyurim_similarity::{FallbackScorer, ScoreBreakdown, ScoringWeights};

pub use hyurim_engine::{
    EngineConfig, EngineError, RecommendationRequest, RecommendationResponse, RecommendationResult, Recommender,
};

// Re-export storage
pub use hyurim_storage::{load_catalog, load_repository, EmbeddingStore};

// Re-export API
pub use hyurim_api::{ApiState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, EmbeddingStore, EngineConfig, EngineError, FacilityId, InMemoryRepository, RecommendationRequest,
        RecommendationResponse, Recommender, StayPeriod, UserAttributes,
    };
}
