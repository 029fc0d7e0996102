//! Recommendation response contract

use hyurim_core::{FacilityId, ForestId, PolicyId};
use hyurim_similarity::ScoreBreakdown;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPathKind {
    Vector,
    Fallback,
}

/// Why a request was served by the fallback scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    ProviderUnavailable,
    IndexNotBuilt,
    VectorNoCandidates,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::ProviderUnavailable => "provider_unavailable",
            FallbackReason::IndexNotBuilt => "index_not_built",
            FallbackReason::VectorNoCandidates => "vector_no_candidates",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub facility_id: FacilityId,
    pub forest_id: ForestId,
    pub facility_name: String,
    pub forest_name: String,
    pub capacity_standard: u32,
    /// Price for the requested stay period; 0 when the tier is unknown
    pub base_price: u64,
    pub effective_price: u64,
    pub applied_policy_id: Option<PolicyId>,
    pub discount_amount: u64,
    pub similarity_score: f32,
    /// 1-based position in the list
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
}

/// A hard constraint that can be dropped to find candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxedConstraint {
    Capacity,
    Region,
    StrictBudget,
}

impl RelaxedConstraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelaxedConstraint::Capacity => "capacity",
            RelaxedConstraint::Region => "region",
            RelaxedConstraint::StrictBudget => "strict_budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationHint {
    pub message: String,
    /// Constraints dropped, in the order they were dropped
    pub dropped: Vec<RelaxedConstraint>,
    /// Facilities that satisfy the relaxed constraints
    pub matching_candidates: usize,
    /// Whether `results` were produced under the relaxed constraints
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub degraded: bool,
    pub path: SearchPathKind,
    pub fallback_reason: Option<FallbackReason>,
    pub inferred_capacity: Option<u32>,
    pub results: Vec<RecommendationResult>,
    pub relaxation: Option<RelaxationHint>,
}

impl RecommendationResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// One entry of the popularity listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingItem {
    pub facility_id: FacilityId,
    pub forest_id: ForestId,
    pub facility_name: String,
    pub forest_name: String,
    pub popularity: f64,
    pub base_price: u64,
    pub rank: usize,
}
