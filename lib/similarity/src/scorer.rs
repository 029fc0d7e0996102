//! Fallback scorer
//!
//! Scores facilities against a query from their attributes alone: lexical
//! overlap, capacity fit, price proximity and popularity. Needs no embedding
//! provider and never fails for lack of data.

use crate::distance::{capacity_match, lexical_overlap, popularity_prior, price_proximity, CapacityFit};
use crate::explain::ScoreBreakdown;
use crate::weights::{ScoringWeights, WeightsError};
use ahash::AHashSet;
use hyurim_core::{token_set, FacilityId, FacilityRecord, StayPeriod};
use serde::Serialize;

/// Excess standard occupancy tolerated before the capacity term reaches 0
pub const DEFAULT_CAPACITY_SLACK: u32 = 4;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("No candidates to score")]
    NoCandidates,
}

/// The parts of a request the fallback scorer reads
#[derive(Debug, Clone, Default)]
pub struct ScoringQuery<'a> {
    pub text: &'a str,
    pub capacity: Option<u32>,
    pub budget: Option<f64>,
    pub stay_period: StayPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub facility_id: FacilityId,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone)]
pub struct FallbackScorer {
    weights: ScoringWeights,
    capacity_slack: u32,
}

impl Default for FallbackScorer {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            capacity_slack: DEFAULT_CAPACITY_SLACK,
        }
    }
}

impl FallbackScorer {
    /// Create a scorer, validating and normalizing `weights`
    pub fn new(mut weights: ScoringWeights, capacity_slack: u32) -> Result<Self, WeightsError> {
        weights.validate_and_normalize()?;
        Ok(Self {
            weights,
            capacity_slack,
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score every candidate against `query`.
    ///
    /// Popularity is scaled against the most popular candidate in the set.
    /// Candidates whose maximum occupancy is below the requested capacity
    /// are dropped. Output follows input order.
    pub fn score_all<'a, I>(&self, candidates: I, query: &ScoringQuery<'_>) -> Result<Vec<ScoredCandidate>, ScoringError>
    where
        I: IntoIterator<Item = &'a FacilityRecord>,
    {
        let candidates: Vec<&FacilityRecord> = candidates.into_iter().collect();
        if candidates.is_empty() {
            return Err(ScoringError::NoCandidates);
        }

        let query_tokens = token_set(query.text);
        let max_popularity = candidates
            .iter()
            .map(|f| f.popularity_score())
            .fold(0.0f64, f64::max);

        Ok(candidates
            .into_iter()
            .filter_map(|facility| self.score_one(facility, query, &query_tokens, max_popularity))
            .collect())
    }

    /// `None` when the facility's capacity rules it out
    fn score_one(
        &self,
        facility: &FacilityRecord,
        query: &ScoringQuery<'_>,
        query_tokens: &AHashSet<String>,
        max_popularity: f64,
    ) -> Option<ScoredCandidate> {
        let capacity = match capacity_match(
            query.capacity,
            facility.capacity_standard,
            facility.capacity_maximum,
            self.capacity_slack,
        ) {
            CapacityFit::Excluded => return None,
            CapacityFit::Score(s) => s,
        };

        let breakdown = ScoreBreakdown {
            lexical: lexical_overlap(query_tokens, &facility_tokens(facility)),
            capacity,
            price: price_proximity(facility.price_for(query.stay_period), query.budget),
            popularity: popularity_prior(facility.popularity_score(), max_popularity),
        };

        Some(ScoredCandidate {
            facility_id: facility.id,
            score: breakdown.total(&self.weights),
            breakdown,
        })
    }
}

/// Tokens of the facility's name, description, type and amenities
fn facility_tokens(facility: &FacilityRecord) -> AHashSet<String> {
    let mut tokens = token_set(&facility.name);
    tokens.extend(token_set(&facility.description));
    tokens.extend(token_set(&facility.facility_type));
    for amenity in &facility.amenities {
        tokens.extend(token_set(amenity));
    }
    tokens
}
