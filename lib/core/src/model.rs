//! Repository record shapes
//!
//! Facilities, forests and discount policies are immutable snapshots handed
//! to the engine by the repositories. The engine never mutates them.

use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub u64);

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FacilityId {
    fn from(id: u64) -> Self {
        FacilityId(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForestId(pub String);

impl fmt::Display for ForestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ForestId {
    fn from(id: &str) -> Self {
        ForestId(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub u64);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price tier a stay falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayPeriod {
    #[default]
    OffWeekday,
    OffWeekend,
    PeakWeekend,
}

impl StayPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StayPeriod::OffWeekday => "off_weekday",
            StayPeriod::OffWeekend => "off_weekend",
            StayPeriod::PeakWeekend => "peak_weekend",
        }
    }
}

/// A lodging facility (room, cabin, pension unit) inside a forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub id: FacilityId,
    pub forest_id: ForestId,
    pub name: String,
    #[serde(default)]
    pub facility_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capacity_standard: u32,
    #[serde(default)]
    pub capacity_maximum: u32,
    #[serde(default)]
    pub price_off_weekday: u64,
    #[serde(default)]
    pub price_off_weekend: u64,
    #[serde(default)]
    pub price_peak_weekend: u64,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    /// Non-negative popularity counter
    #[serde(default)]
    pub popularity: f64,
}

impl FacilityRecord {
    /// Price for the given tier; zero means the tier was never collected.
    pub fn price_for(&self, period: StayPeriod) -> Option<u64> {
        let price = match period {
            StayPeriod::OffWeekday => self.price_off_weekday,
            StayPeriod::OffWeekend => self.price_off_weekend,
            StayPeriod::PeakWeekend => self.price_peak_weekend,
        };
        (price > 0).then_some(price)
    }

    /// Largest party the facility can host. A missing maximum falls back
    /// to the standard capacity.
    pub fn capacity_ceiling(&self) -> u32 {
        self.capacity_maximum.max(self.capacity_standard)
    }

    /// Popularity clamped to the non-negative range
    pub fn popularity_score(&self) -> f64 {
        if self.popularity.is_finite() {
            self.popularity.max(0.0)
        } else {
            0.0
        }
    }

    /// The text this facility is embedded from.
    ///
    /// Uses the description. Facilities crawled without one get a text
    /// assembled from name, type, forest, region and amenities. Party-size
    /// and price band phrases are appended to either.
    pub fn document_text(&self, forest: Option<&ForestRecord>) -> String {
        let description = self.description.trim();
        let mut parts: Vec<&str> = if description.is_empty() {
            self.attribute_parts(forest)
        } else {
            vec![description]
        };

        if self.capacity_standard > 0 {
            parts.push(capacity_band(self.capacity_standard));
        }
        if let Some(price) = self.average_price() {
            parts.push(price_band(price));
        }
        parts.join(" ")
    }

    fn attribute_parts<'a>(&'a self, forest: Option<&'a ForestRecord>) -> Vec<&'a str> {
        let mut parts: Vec<&str> = vec![self.name.as_str()];
        if !self.facility_type.is_empty() {
            parts.push(&self.facility_type);
        }
        if let Some(forest) = forest {
            parts.push(&forest.name);
            if !forest.region.is_empty() {
                parts.push(&forest.region);
            }
        }
        parts.extend(self.amenities.iter().map(String::as_str));
        parts
    }

    /// Mean of the off-season weekday and peak weekend prices that are known
    fn average_price(&self) -> Option<u64> {
        let known: Vec<u64> = [self.price_off_weekday, self.price_peak_weekend]
            .into_iter()
            .filter(|p| *p > 0)
            .collect();
        (!known.is_empty()).then(|| known.iter().sum::<u64>() / known.len() as u64)
    }
}

/// Party-size phrase shared by facility documents and expanded queries
pub fn capacity_band(capacity: u32) -> &'static str {
    match capacity {
        0..=4 => "소규모가족 커플여행",
        5..=8 => "중간가족 가족여행",
        _ => "대가족 단체여행",
    }
}

/// Price-level phrase for a nightly price in won
pub fn price_band(price: u64) -> &'static str {
    match price {
        0..=99_999 => "저가격대 경제적",
        100_000..=199_999 => "중가격대 합리적",
        _ => "고가격대 프리미엄",
    }
}

/// A recreation forest owning one or more facilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRecord {
    pub id: ForestId,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub main_facilities: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Exemption,
    FixedAmount,
}

/// What a policy discounts. Only lodging policies touch a room price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyCategory {
    #[default]
    Lodging,
    Entrance,
    Parking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

/// Inclusive tier range, e.g. disability grades 1 to 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: u8,
    pub max: u8,
}

/// A single named attribute check a user must satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition_type", content = "condition_value", rename_all = "snake_case")]
pub enum EligibilityCondition {
    TargetGroup(String),
    Age(AgeRange),
    Residence(String),
    Grade(GradeRange),
    StayPeriod(StayPeriod),
}

impl EligibilityCondition {
    /// A condition with no corresponding declared attribute does not hold.
    pub fn matches(&self, attrs: &UserAttributes) -> bool {
        match self {
            EligibilityCondition::TargetGroup(group) => attrs
                .target_group
                .iter()
                .any(|declared| labels_match(declared, group)),
            EligibilityCondition::Age(range) => attrs.age.is_some_and(|age| {
                range.min.map_or(true, |min| age >= min) && range.max.map_or(true, |max| age <= max)
            }),
            EligibilityCondition::Residence(residence) => attrs
                .residence
                .as_deref()
                .is_some_and(|declared| labels_match(declared, residence)),
            EligibilityCondition::Grade(range) => attrs
                .grade
                .is_some_and(|grade| grade >= range.min && grade <= range.max),
            EligibilityCondition::StayPeriod(period) => attrs.stay_period == Some(*period),
        }
    }
}

fn labels_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// An eligibility-condition to discount-effect rule of one forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    pub id: PolicyId,
    pub forest_id: ForestId,
    #[serde(default)]
    pub target_group: String,
    #[serde(default)]
    pub policy_category: PolicyCategory,
    pub discount_type: DiscountType,
    /// 0 to 100, read only for percentage policies
    #[serde(default)]
    pub discount_rate: f64,
    /// Currency units, read only for fixed-amount policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<u64>,
    #[serde(default)]
    pub conditions: SmallVec<[EligibilityCondition; 2]>,
    #[serde(default)]
    pub description: String,
}

impl DiscountPolicy {
    /// Price reduction this policy grants on `base_price`. Never exceeds it.
    pub fn reduction_for(&self, base_price: u64) -> u64 {
        let reduction = match self.discount_type {
            DiscountType::Percentage => {
                let rate = if self.discount_rate.is_finite() {
                    self.discount_rate.clamp(0.0, 100.0)
                } else {
                    0.0
                };
                (base_price as f64 * rate / 100.0).round() as u64
            }
            DiscountType::Exemption => base_price,
            DiscountType::FixedAmount => self.discount_amount.unwrap_or(0),
        };
        reduction.min(base_price)
    }

    /// True when every condition holds for `attrs`.
    ///
    /// Crawled policies often carry only a target group label; that label
    /// then stands in as the single condition. A policy with neither
    /// conditions nor a label never matches.
    pub fn is_satisfied_by(&self, attrs: &UserAttributes) -> bool {
        if !self.conditions.is_empty() {
            return self.conditions.iter().all(|c| c.matches(attrs));
        }
        if self.target_group.trim().is_empty() {
            return false;
        }
        EligibilityCondition::TargetGroup(self.target_group.clone()).matches(attrs)
    }
}

/// Attributes a user declares to claim discounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAttributes {
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub target_group: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    /// Filled in from the request's stay period, never declared directly
    #[serde(skip)]
    pub stay_period: Option<StayPeriod>,
}

impl UserAttributes {
    #[must_use]
    pub fn with_target_group(mut self, group: impl Into<String>) -> Self {
        self.target_group.push(group.into());
        self
    }

    #[must_use]
    pub fn with_stay_period(mut self, period: StayPeriod) -> Self {
        self.stay_period = Some(period);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(group) => vec![group],
        OneOrMany::Many(groups) => groups,
    })
}

/// Everything the repositories hold, as one serializable document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub forests: Vec<ForestRecord>,
    #[serde(default)]
    pub facilities: Vec<FacilityRecord>,
    #[serde(default)]
    pub discount_policies: Vec<DiscountPolicy>,
}
