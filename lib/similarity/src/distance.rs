//! Per-term similarity functions for fallback scoring
//!
//! All functions return a similarity score in range [0.0, 1.0] where 1.0 is
//! the best possible fit. Missing inputs yield [`NEUTRAL_SCORE`].

use crate::weights::NEUTRAL_SCORE;
use ahash::AHashSet;

/// Share of query tokens found in the facility's tokens
///
/// # Returns
/// |query ∩ document| / |query|, or neutral for an empty query
pub fn lexical_overlap(query_tokens: &AHashSet<String>, document_tokens: &AHashSet<String>) -> f32 {
    if query_tokens.is_empty() {
        return NEUTRAL_SCORE;
    }
    let shared = query_tokens.intersection(document_tokens).count();
    shared as f32 / query_tokens.len() as f32
}

/// Outcome of matching a party size against a facility
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapacityFit {
    /// The party does not fit even at maximum occupancy
    Excluded,
    Score(f32),
}

/// Calculate how well a facility's capacity fits the requested party size
///
/// # Arguments
/// * `requested` - Party size, if the user gave one
/// * `standard` - Standard occupancy
/// * `maximum` - Maximum occupancy
/// * `slack` - Excess standard occupancy tolerated before the score reaches 0
pub fn capacity_match(requested: Option<u32>, standard: u32, maximum: u32, slack: u32) -> CapacityFit {
    let requested = match requested {
        Some(r) if r > 0 => r,
        _ => return CapacityFit::Score(NEUTRAL_SCORE),
    };

    let ceiling = maximum.max(standard);
    if ceiling < requested {
        return CapacityFit::Excluded;
    }

    if standard >= requested {
        // linear decay: 1.0 at an exact fit, 0.0 once excess passes the slack
        let excess = (standard - requested) as f32;
        let score = 1.0 - excess / (slack as f32 + 1.0);
        CapacityFit::Score(score.max(0.0))
    } else {
        // fits only with extra bedding
        let partial = standard as f32 / requested as f32;
        CapacityFit::Score(partial.min(0.5))
    }
}

/// Calculate price proximity to the budget
///
/// 1.0 at the budget, decaying linearly to 0.0 one budget away.
/// Unknown price or absent budget is neutral.
pub fn price_proximity(price: Option<u64>, budget: Option<f64>) -> f32 {
    let (price, budget) = match (price, budget) {
        (Some(p), Some(b)) if b.is_finite() && b >= 0.0 => (p as f64, b),
        _ => return NEUTRAL_SCORE,
    };

    if budget == 0.0 {
        return 0.0;
    }

    let relative_diff = (price - budget).abs() / budget;
    (1.0 - relative_diff).clamp(0.0, 1.0) as f32
}

/// Log-scaled popularity relative to the most popular candidate
pub fn popularity_prior(popularity: f64, max_popularity: f64) -> f32 {
    if !max_popularity.is_finite() || max_popularity <= 0.0 {
        return NEUTRAL_SCORE;
    }
    let p = if popularity.is_finite() { popularity.max(0.0) } else { 0.0 };
    (p.ln_1p() / max_popularity.ln_1p()).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyurim_core::token_set;

    #[test]
    fn test_lexical_overlap() {
        let query = token_set("family room kitchen");
        let doc = token_set("Spacious family room with ocean view");
        assert!((lexical_overlap(&query, &doc) - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(lexical_overlap(&token_set(""), &doc), NEUTRAL_SCORE);
        assert_eq!(lexical_overlap(&query, &token_set("")), 0.0);
    }

    fn score(fit: CapacityFit) -> f32 {
        match fit {
            CapacityFit::Score(s) => s,
            CapacityFit::Excluded => panic!("unexpected exclusion"),
        }
    }

    #[test]
    fn test_capacity_exact_and_slack() {
        assert_eq!(capacity_match(Some(4), 4, 6, 4), CapacityFit::Score(1.0));
        // excess of 2 with slack 4 decays to 1 - 2/5
        assert!((score(capacity_match(Some(4), 6, 8, 4)) - 0.6).abs() < 1e-6);
        assert_eq!(capacity_match(Some(2), 10, 12, 4), CapacityFit::Score(0.0));
        assert_eq!(capacity_match(Some(2), 3, 3, 0), CapacityFit::Score(0.0));
    }

    #[test]
    fn test_capacity_partial_and_excluded() {
        // 4 people in a room for 3 that takes 5 at most
        assert_eq!(capacity_match(Some(4), 3, 5, 4), CapacityFit::Score(0.5));
        assert!((score(capacity_match(Some(6), 2, 6, 4)) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(capacity_match(Some(7), 4, 6, 4), CapacityFit::Excluded);
        // missing maximum falls back to standard
        assert_eq!(capacity_match(Some(4), 4, 0, 4), CapacityFit::Score(1.0));
    }

    #[test]
    fn test_capacity_without_request_is_neutral() {
        assert_eq!(capacity_match(None, 4, 6, 4), CapacityFit::Score(NEUTRAL_SCORE));
        assert_eq!(capacity_match(Some(0), 4, 6, 4), CapacityFit::Score(NEUTRAL_SCORE));
    }

    #[test]
    fn test_price_proximity() {
        assert_eq!(price_proximity(Some(50_000), Some(50_000.0)), 1.0);
        assert!((price_proximity(Some(40_000), Some(50_000.0)) - 0.8).abs() < 1e-6);
        assert!((price_proximity(Some(60_000), Some(50_000.0)) - 0.8).abs() < 1e-6);
        assert_eq!(price_proximity(Some(120_000), Some(50_000.0)), 0.0);
        assert_eq!(price_proximity(None, Some(50_000.0)), NEUTRAL_SCORE);
        assert_eq!(price_proximity(Some(50_000), None), NEUTRAL_SCORE);
        assert_eq!(price_proximity(Some(10), Some(0.0)), 0.0);
    }

    #[test]
    fn test_popularity_prior() {
        assert_eq!(popularity_prior(0.0, 0.0), NEUTRAL_SCORE);
        assert_eq!(popularity_prior(99.0, 99.0), 1.0);
        assert_eq!(popularity_prior(0.0, 99.0), 0.0);
        let mid = popularity_prior(9.0, 99.0);
        assert!((mid - 0.5).abs() < 1e-6);
    }
}
