//! # Hyurim Core
//!
//! Core library for the Hyurim lodging recommender.
//!
//! This crate provides the fundamental data structures:
//!
//! - [`FacilityRecord`], [`ForestRecord`], [`DiscountPolicy`] - Repository record shapes
//! - [`Vector`] - Dense embedding vector
//! - [`EmbeddingProvider`] - Text to vector, with a hashing and a disabled implementation
//! - [`EmbeddingCache`] - Per-facility embeddings keyed by a text fingerprint
//! - [`VectorIndex`] - Exact cosine top-K over facility embeddings
//!
//! ## Example
//!
//! ```rust
//! use hyurim_core::{EmbeddingProvider, FacilityId, HashingEmbedder, VectorIndex};
//!
//! let embedder = HashingEmbedder::new(64);
//! let index = VectorIndex::new();
//! index
//!     .build(vec![
//!         (FacilityId(1), embedder.embed("family room with kitchen").unwrap()),
//!         (FacilityId(2), embedder.embed("single bunk dormitory").unwrap()),
//!     ])
//!     .unwrap();
//!
//! let query = embedder.embed("family room").unwrap();
//! let hits = index.search(&query, 1).unwrap();
//! assert_eq!(hits[0].0, FacilityId(1));
//! ```

pub mod cache;
pub mod embedding;
pub mod error;
pub mod index;
pub mod model;
pub mod repository;
pub mod tokenize;
pub mod vector;

pub use cache::{fingerprint, CachedEmbedding, EmbeddingCache};
pub use embedding::{
    DisabledEmbedder, EmbeddingProvider, HashingEmbedder, ProviderStatus, DEFAULT_EMBEDDING_DIM,
};
pub use error::{Error, Result};
pub use index::VectorIndex;
pub use model::{
    capacity_band, price_band, AgeRange, Catalog, DiscountPolicy, DiscountType, EligibilityCondition, FacilityId,
    FacilityRecord, ForestId, ForestRecord, GradeRange, PolicyCategory, PolicyId, StayPeriod,
    UserAttributes,
};
pub use repository::{DiscountPolicyRepository, FacilityRepository, InMemoryRepository};
pub use tokenize::{token_set, tokenize};
pub use vector::Vector;
