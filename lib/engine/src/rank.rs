//! Ranking and forest diversity

use ahash::AHashMap;
use hyurim_core::{FacilityId, ForestId};
use hyurim_similarity::ScoreBreakdown;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// A scored facility before discounts are applied
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub facility_id: FacilityId,
    pub forest_id: ForestId,
    pub score: f32,
    pub breakdown: Option<ScoreBreakdown>,
}

/// Sort by score descending, ties by ascending facility id
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| (Reverse(OrderedFloat(c.score)), c.facility_id));
}

/// Order candidates and keep the best `result_count`.
///
/// With `max_per_forest` set, a candidate whose forest already has that many
/// entries is deferred in favor of the next best from another forest.
/// Deferred candidates back-fill the list, best first, if it would
/// otherwise come up short.
pub fn rank(mut candidates: Vec<Candidate>, result_count: usize, max_per_forest: Option<usize>) -> Vec<Candidate> {
    sort_candidates(&mut candidates);

    let cap = match max_per_forest {
        Some(cap) => cap,
        None => {
            candidates.truncate(result_count);
            return candidates;
        }
    };

    let mut selected = Vec::with_capacity(result_count.min(candidates.len()));
    let mut deferred = Vec::new();
    let mut per_forest: AHashMap<ForestId, usize> = AHashMap::new();

    for candidate in candidates {
        if selected.len() == result_count {
            break;
        }
        let count = per_forest.entry(candidate.forest_id.clone()).or_insert(0);
        if *count < cap {
            *count += 1;
            selected.push(candidate);
        } else {
            deferred.push(candidate);
        }
    }

    let missing = result_count.saturating_sub(selected.len());
    if missing > 0 && !deferred.is_empty() {
        selected.extend(deferred.into_iter().take(missing));
        sort_candidates(&mut selected);
    }

    selected
}
