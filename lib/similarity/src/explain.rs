//! Per-term score explanations

use crate::weights::ScoringWeights;
use serde::{Deserialize, Serialize};

/// Raw sub-scores of one fallback-scored facility, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub lexical: f32,
    pub capacity: f32,
    pub price: f32,
    pub popularity: f32,
}

impl ScoreBreakdown {
    /// Weighted sum of the sub-scores, clamped to [0, 1]
    pub fn total(&self, weights: &ScoringWeights) -> f32 {
        let total = self.lexical * weights.lexical
            + self.capacity * weights.capacity
            + self.price * weights.price
            + self.popularity * weights.popularity;
        total.clamp(0.0, 1.0)
    }
}
