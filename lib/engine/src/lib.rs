//! # Hyurim Engine
//!
//! The hybrid recommendation engine: semantic search over facility
//! embeddings with an always-available attribute scorer behind it.
//!
//! ## Example
//!
//! ```rust
//! use hyurim_core::{Catalog, InMemoryRepository};
//! use hyurim_engine::{EngineConfig, RecommendationRequest, Recommender};
//! use std::sync::Arc;
//!
//! let repository = Arc::new(InMemoryRepository::new(Catalog::default()));
//! let engine = Recommender::with_repository(EngineConfig::default(), repository).unwrap();
//! engine.rebuild_index().unwrap();
//!
//! let response = engine.recommend(&RecommendationRequest::new("quiet cabin")).unwrap();
//! assert!(response.results.is_empty());
//! ```
//!
//! ## Request lifecycle
//!
//! ```text
//! request ──> validate ──> PathSelect ──┬─> Vector:   embed ──> index top-K ──┐
//!                                       └─> Fallback: score admitted set ─────┤
//!                                                                             v
//!             response <── Discount <── Rank + diversity <── hard constraints
//! ```

pub mod config;
pub mod discount;
pub mod error;
pub mod orchestrator;
pub mod path;
pub mod query;
pub mod rank;
pub mod relax;
pub mod request;
pub mod response;
pub mod snapshot;

pub use config::{EmbeddingConfig, EngineConfig, ProviderKind};
pub use discount::{AppliedDiscount, DiscountAdjuster};
pub use error::{EngineError, Result};
pub use orchestrator::{EngineStatus, RebuildReport, Recommender};
pub use path::{select_path, Capabilities, SearchPath};
pub use query::{expand_query, infer_capacity};
pub use rank::{rank, Candidate};
pub use relax::{plan_relaxation, RelaxationPlan};
pub use request::{Preferences, RecommendationRequest, ValidatedRequest};
pub use response::{
    FallbackReason, RecommendationResponse, RecommendationResult, RelaxationHint, RelaxedConstraint,
    SearchPathKind, TrendingItem,
};
pub use snapshot::{CatalogSnapshot, HardConstraints};
