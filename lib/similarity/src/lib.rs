//! # Hyurim Similarity
//!
//! Attribute-based fallback scoring for facilities.
//!
//! This crate ranks facilities without any embedding model, so the engine
//! can always answer a request even when the semantic path is down.
//!
//! ## Features
//!
//! - **Fixed weights**: lexical 0.4, capacity 0.3, price 0.2, popularity 0.1
//! - **Neutral defaults**: a term with no data contributes 0.5
//! - **Explainability**: per-term breakdown for every scored facility
//!
//! ## Example
//!
//! ```rust
//! use hyurim_similarity::{FallbackScorer, ScoringQuery};
//! use hyurim_core::{FacilityId, FacilityRecord, ForestId};
//!
//! let facility = FacilityRecord {
//!     id: FacilityId(1),
//!     forest_id: ForestId::from("F1"),
//!     name: "Pine cabin".to_string(),
//!     facility_type: "cabin".to_string(),
//!     description: "family room with kitchen".to_string(),
//!     capacity_standard: 4,
//!     capacity_maximum: 6,
//!     price_off_weekday: 45_000,
//!     price_off_weekend: 60_000,
//!     price_peak_weekend: 80_000,
//!     amenities: Default::default(),
//!     popularity: 12.0,
//! };
//!
//! let scorer = FallbackScorer::default();
//! let query = ScoringQuery { text: "family room", capacity: Some(4), ..Default::default() };
//! let scored = scorer.score_all([&facility], &query).unwrap();
//! assert_eq!(scored[0].facility_id, FacilityId(1));
//! ```

pub mod distance;
pub mod explain;
pub mod scorer;
pub mod weights;

pub use distance::{capacity_match, lexical_overlap, popularity_prior, price_proximity, CapacityFit};
pub use explain::ScoreBreakdown;
pub use scorer::{FallbackScorer, ScoredCandidate, ScoringError, ScoringQuery, DEFAULT_CAPACITY_SLACK};
pub use weights::{ScoringWeights, WeightsError, NEUTRAL_SCORE};
