//! Fallback scoring weights
//!
//! Four fixed terms: lexical overlap, capacity match, price proximity and
//! popularity prior. Overrides are validated and renormalized to sum to 1.

use serde::{Deserialize, Serialize};

/// Contribution of a term that has no data to judge by
pub const NEUTRAL_SCORE: f32 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub lexical: f32,
    pub capacity: f32,
    pub price: f32,
    pub popularity: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            lexical: 0.4,
            capacity: 0.3,
            price: 0.2,
            popularity: 0.1,
        }
    }
}

impl ScoringWeights {
    pub fn new(lexical: f32, capacity: f32, price: f32, popularity: f32) -> Self {
        Self {
            lexical,
            capacity,
            price,
            popularity,
        }
    }

    /// Validate the weights
    /// - Checks that every weight is finite and non-negative
    /// - Normalizes weights to sum to 1.0 if they don't
    pub fn validate_and_normalize(&mut self) -> Result<(), WeightsError> {
        for (name, weight) in self.named() {
            if !weight.is_finite() {
                return Err(WeightsError::NonFinite(name));
            }
            if weight < 0.0 {
                return Err(WeightsError::NegativeWeight(name));
            }
        }

        let weight_sum = self.sum();
        if weight_sum <= 0.0 {
            return Err(WeightsError::ZeroTotalWeight);
        }

        if (weight_sum - 1.0).abs() > 0.001 {
            self.lexical /= weight_sum;
            self.capacity /= weight_sum;
            self.price /= weight_sum;
            self.popularity /= weight_sum;
        }

        Ok(())
    }

    pub fn sum(&self) -> f32 {
        self.lexical + self.capacity + self.price + self.popularity
    }

    fn named(&self) -> [(&'static str, f32); 4] {
        [
            ("lexical", self.lexical),
            ("capacity", self.capacity),
            ("price", self.price),
            ("popularity", self.popularity),
        ]
    }
}

/// Errors that can occur during weight validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    #[error("Weight '{0}' is negative")]
    NegativeWeight(&'static str),

    #[error("Weight '{0}' is not a finite number")]
    NonFinite(&'static str),

    #[error("Total weight cannot be zero")]
    ZeroTotalWeight,
}
