//! Recommendation request contract and boundary validation
//!
//! Requests arrive loosely typed (signed integers, free strings) so that
//! out-of-range values can be reported per field. `validate` turns them into
//! a [`ValidatedRequest`] before any scoring happens.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::query::infer_capacity;
use hyurim_core::{StayPeriod, UserAttributes};
use serde::{Deserialize, Serialize};

const MAX_AGE: u32 = 150;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<UserAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preferences {
    pub capacity: Option<i64>,
    pub budget: Option<f64>,
    pub region: Option<String>,
    pub strict_budget: bool,
    pub result_count: Option<i64>,
    pub stay_period: StayPeriod,
    pub allow_relaxation: bool,
}

impl RecommendationRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.preferences.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.preferences.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn with_strict_budget(mut self) -> Self {
        self.preferences.strict_budget = true;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.preferences.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_result_count(mut self, count: i64) -> Self {
        self.preferences.result_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_stay_period(mut self, period: StayPeriod) -> Self {
        self.preferences.stay_period = period;
        self
    }

    #[must_use]
    pub fn with_relaxation(mut self) -> Self {
        self.preferences.allow_relaxation = true;
        self
    }

    #[must_use]
    pub fn with_eligibility(mut self, attrs: UserAttributes) -> Self {
        self.eligibility = Some(attrs);
        self
    }

    /// Check every field against `config` and resolve defaults.
    ///
    /// When no capacity is given and inference is enabled, a party size
    /// mentioned in the query text is used instead.
    pub fn validate(&self, config: &EngineConfig) -> Result<ValidatedRequest> {
        let query = self.query.trim().to_string();
        let query_chars = query.chars().count();
        if query_chars > config.max_query_chars {
            return Err(EngineError::invalid(
                "query",
                format!("{} characters exceeds the limit of {}", query_chars, config.max_query_chars),
            ));
        }

        let prefs = &self.preferences;

        let capacity = match prefs.capacity {
            None => None,
            Some(c) if c <= 0 => return Err(EngineError::invalid("capacity", "must be a positive integer")),
            Some(c) => Some(u32::try_from(c).map_err(|_| EngineError::invalid("capacity", "is too large"))?),
        };

        if let Some(budget) = prefs.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(EngineError::invalid("budget", "must be a non-negative number"));
            }
        }

        let region = match prefs.region.as_deref().map(str::trim) {
            None => None,
            Some("") => return Err(EngineError::invalid("region", "must not be blank")),
            Some(region) => Some(region.to_string()),
        };

        let result_count = match prefs.result_count {
            None => config.default_result_count,
            Some(n) if n >= 1 && n as u64 <= config.max_result_count as u64 => n as usize,
            Some(_) => {
                return Err(EngineError::invalid(
                    "result_count",
                    format!("must be between 1 and {}", config.max_result_count),
                ))
            }
        };

        let attributes = self.eligibility.clone().unwrap_or_default();
        if attributes.age.is_some_and(|age| age > MAX_AGE) {
            return Err(EngineError::invalid("eligibility.age", format!("must be at most {MAX_AGE}")));
        }
        if attributes.grade == Some(0) {
            return Err(EngineError::invalid("eligibility.grade", "must be at least 1"));
        }
        if attributes.target_group.iter().any(|g| g.trim().is_empty()) {
            return Err(EngineError::invalid("eligibility.target_group", "must not contain blank labels"));
        }

        let inferred_capacity = match capacity {
            None if config.infer_capacity_from_query => infer_capacity(&query),
            _ => None,
        };

        Ok(ValidatedRequest {
            query,
            capacity: capacity.or(inferred_capacity),
            inferred_capacity,
            budget: prefs.budget,
            region,
            strict_budget: prefs.strict_budget,
            result_count,
            stay_period: prefs.stay_period,
            allow_relaxation: prefs.allow_relaxation,
            attributes: attributes.with_stay_period(prefs.stay_period),
        })
    }
}

/// A request that passed validation, with defaults resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub query: String,
    /// Requested or inferred party size
    pub capacity: Option<u32>,
    pub inferred_capacity: Option<u32>,
    pub budget: Option<f64>,
    pub region: Option<String>,
    pub strict_budget: bool,
    pub result_count: usize,
    pub stay_period: StayPeriod,
    pub allow_relaxation: bool,
    pub attributes: UserAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn field_of(request: RecommendationRequest) -> Option<&'static str> {
        request.validate(&config()).unwrap_err().field()
    }

    #[test]
    fn test_defaults_resolve() {
        let validated = RecommendationRequest::new("  quiet cabin ").validate(&config()).unwrap();
        assert_eq!(validated.query, "quiet cabin");
        assert_eq!(validated.result_count, 5);
        assert_eq!(validated.capacity, None);
        assert_eq!(validated.stay_period, StayPeriod::OffWeekday);
        assert_eq!(validated.attributes.stay_period, Some(StayPeriod::OffWeekday));
    }

    #[test]
    fn test_rejects_out_of_range_fields() {
        assert_eq!(field_of(RecommendationRequest::new("x").with_capacity(0)), Some("capacity"));
        assert_eq!(field_of(RecommendationRequest::new("x").with_capacity(-3)), Some("capacity"));
        assert_eq!(field_of(RecommendationRequest::new("x").with_budget(-1.0)), Some("budget"));
        assert_eq!(field_of(RecommendationRequest::new("x").with_budget(f64::INFINITY)), Some("budget"));
        assert_eq!(field_of(RecommendationRequest::new("x").with_region("  ")), Some("region"));
        assert_eq!(field_of(RecommendationRequest::new("x").with_result_count(0)), Some("result_count"));
        assert_eq!(field_of(RecommendationRequest::new("x").with_result_count(51)), Some("result_count"));
        assert_eq!(field_of(RecommendationRequest::new("x".repeat(1001))), Some("query"));

        let old = UserAttributes {
            age: Some(151),
            ..Default::default()
        };
        assert_eq!(field_of(RecommendationRequest::new("x").with_eligibility(old)), Some("eligibility.age"));
        let grade_zero = UserAttributes {
            grade: Some(0),
            ..Default::default()
        };
        assert_eq!(
            field_of(RecommendationRequest::new("x").with_eligibility(grade_zero)),
            Some("eligibility.grade")
        );
    }

    #[test]
    fn test_capacity_inference() {
        let validated = RecommendationRequest::new("4-person family room").validate(&config()).unwrap();
        assert_eq!(validated.capacity, Some(4));
        assert_eq!(validated.inferred_capacity, Some(4));

        let explicit = RecommendationRequest::new("4-person family room")
            .with_capacity(2)
            .validate(&config())
            .unwrap();
        assert_eq!(explicit.capacity, Some(2));
        assert_eq!(explicit.inferred_capacity, None);

        let mut no_inference = config();
        no_inference.infer_capacity_from_query = false;
        let validated = RecommendationRequest::new("4인 가족").validate(&no_inference).unwrap();
        assert_eq!(validated.capacity, None);
    }

    #[test]
    fn test_wire_shape() {
        let request: RecommendationRequest = serde_json::from_value(json!({
            "query": "family room",
            "preferences": {"capacity": 4, "result_count": 3, "stay_period": "peak_weekend"},
            "eligibility": {"target_group": "large_family", "age": 40}
        }))
        .unwrap();
        let validated = request.validate(&config()).unwrap();
        assert_eq!(validated.capacity, Some(4));
        assert_eq!(validated.result_count, 3);
        assert_eq!(validated.stay_period, StayPeriod::PeakWeekend);
        assert_eq!(validated.attributes.target_group, vec!["large_family".to_string()]);

        let unknown = serde_json::from_value::<RecommendationRequest>(json!({
            "query": "x",
            "preferences": {"colour": "blue"}
        }));
        assert!(unknown.is_err());
    }
}
