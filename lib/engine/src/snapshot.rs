//! Point-in-time view of the repositories plus hard-constraint filtering

use crate::error::Result;
use crate::request::ValidatedRequest;
use crate::response::RelaxedConstraint;
use ahash::AHashMap;
use hyurim_core::{
    DiscountPolicy, DiscountPolicyRepository, FacilityId, FacilityRecord, FacilityRepository, ForestId,
    ForestRecord, StayPeriod,
};
use std::collections::BTreeMap;

/// Repository contents read once at the start of a request
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    facilities: BTreeMap<FacilityId, FacilityRecord>,
    forests: AHashMap<ForestId, ForestRecord>,
    policies: AHashMap<ForestId, Vec<DiscountPolicy>>,
}

impl CatalogSnapshot {
    pub fn load(facilities: &dyn FacilityRepository, policies: &dyn DiscountPolicyRepository) -> Result<Self> {
        Ok(Self::from_parts(
            facilities.list_facilities()?,
            facilities.list_forests()?,
            policies.list_policies()?,
        ))
    }

    pub fn from_parts(
        facilities: Vec<FacilityRecord>,
        forests: Vec<ForestRecord>,
        policies: Vec<DiscountPolicy>,
    ) -> Self {
        let mut by_forest: AHashMap<ForestId, Vec<DiscountPolicy>> = AHashMap::new();
        for policy in policies {
            by_forest.entry(policy.forest_id.clone()).or_default().push(policy);
        }
        Self {
            facilities: facilities.into_iter().map(|f| (f.id, f)).collect(),
            forests: forests.into_iter().map(|f| (f.id.clone(), f)).collect(),
            policies: by_forest,
        }
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn facility(&self, id: FacilityId) -> Option<&FacilityRecord> {
        self.facilities.get(&id)
    }

    /// Facilities in ascending id order
    pub fn facilities(&self) -> impl Iterator<Item = &FacilityRecord> {
        self.facilities.values()
    }

    pub fn forest(&self, id: &ForestId) -> Option<&ForestRecord> {
        self.forests.get(id)
    }

    pub fn policies_for(&self, forest_id: &ForestId) -> &[DiscountPolicy] {
        self.policies.get(forest_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Facilities admitted by `constraints`, in ascending id order
    pub fn admitted<'a>(&'a self, constraints: &'a HardConstraints) -> impl Iterator<Item = &'a FacilityRecord> + 'a {
        self.facilities()
            .filter(move |f| constraints.admits(f, self.forest(&f.forest_id)))
    }

    pub fn count_admitted(&self, constraints: &HardConstraints) -> usize {
        self.admitted(constraints).count()
    }
}

/// Filters applied on every path regardless of score
#[derive(Debug, Clone, PartialEq)]
pub struct HardConstraints {
    pub capacity: Option<u32>,
    /// Lowercased region needle
    pub region: Option<String>,
    /// Price ceiling, set only for strict budgets
    pub max_price: Option<f64>,
    pub stay_period: StayPeriod,
}

impl HardConstraints {
    pub fn from_request(request: &ValidatedRequest) -> Self {
        Self {
            capacity: request.capacity,
            region: request.region.as_deref().map(str::to_lowercase),
            max_price: if request.strict_budget { request.budget } else { None },
            stay_period: request.stay_period,
        }
    }

    /// True when the facility fits the party, lies in the region and, for a
    /// strict budget, is known to be affordable or has no known price.
    pub fn admits(&self, facility: &FacilityRecord, forest: Option<&ForestRecord>) -> bool {
        if let Some(capacity) = self.capacity {
            if facility.capacity_ceiling() < capacity {
                return false;
            }
        }

        if let Some(region) = &self.region {
            let matches = forest.is_some_and(|forest| {
                forest.region.to_lowercase().contains(region.as_str())
                    || forest.name.to_lowercase().contains(region.as_str())
            });
            if !matches {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if let Some(price) = facility.price_for(self.stay_period) {
                if price as f64 > max_price {
                    return false;
                }
            }
        }

        true
    }

    /// Constraints that are currently set, in relaxation order
    pub fn active(&self) -> Vec<RelaxedConstraint> {
        let mut active = Vec::new();
        if self.capacity.is_some() {
            active.push(RelaxedConstraint::Capacity);
        }
        if self.region.is_some() {
            active.push(RelaxedConstraint::Region);
        }
        if self.max_price.is_some() {
            active.push(RelaxedConstraint::StrictBudget);
        }
        active
    }

    /// A copy with `constraint` removed
    #[must_use]
    pub fn without(&self, constraint: RelaxedConstraint) -> Self {
        let mut relaxed = self.clone();
        match constraint {
            RelaxedConstraint::Capacity => relaxed.capacity = None,
            RelaxedConstraint::Region => relaxed.region = None,
            RelaxedConstraint::StrictBudget => relaxed.max_price = None,
        }
        relaxed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest(id: &str, name: &str, region: &str) -> ForestRecord {
        ForestRecord {
            id: ForestId::from(id),
            name: name.to_string(),
            region: region.to_string(),
            address: String::new(),
            main_facilities: String::new(),
        }
    }

    fn facility(id: u64, forest: &str, standard: u32, maximum: u32, price: u64) -> FacilityRecord {
        FacilityRecord {
            id: FacilityId(id),
            forest_id: ForestId::from(forest),
            name: format!("Room {id}"),
            facility_type: String::new(),
            description: String::new(),
            capacity_standard: standard,
            capacity_maximum: maximum,
            price_off_weekday: price,
            price_off_weekend: 0,
            price_peak_weekend: 0,
            amenities: Default::default(),
            popularity: 0.0,
        }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_parts(
            vec![
                facility(3, "F2", 2, 2, 40_000),
                facility(1, "F1", 4, 6, 45_000),
                facility(2, "F1", 6, 8, 0),
            ],
            vec![forest("F1", "Jeolmul Forest", "Jeju"), forest("F2", "Yuseong", "Daejeon")],
            Vec::new(),
        )
    }

    fn constraints() -> HardConstraints {
        HardConstraints {
            capacity: None,
            region: None,
            max_price: None,
            stay_period: StayPeriod::OffWeekday,
        }
    }

    fn admitted_ids(snapshot: &CatalogSnapshot, constraints: &HardConstraints) -> Vec<u64> {
        snapshot.admitted(constraints).map(|f| f.id.0).collect()
    }

    #[test]
    fn test_capacity_uses_maximum_occupancy() {
        let snapshot = snapshot();
        let c = HardConstraints {
            capacity: Some(5),
            ..constraints()
        };
        assert_eq!(admitted_ids(&snapshot, &c), vec![1, 2]);
    }

    #[test]
    fn test_region_matches_substring_of_region_or_name() {
        let snapshot = snapshot();
        let c = HardConstraints {
            region: Some("jeju".to_string()),
            ..constraints()
        };
        assert_eq!(admitted_ids(&snapshot, &c), vec![1, 2]);
        let c = HardConstraints {
            region: Some("yuseong".to_string()),
            ..constraints()
        };
        assert_eq!(admitted_ids(&snapshot, &c), vec![3]);
    }

    #[test]
    fn test_strict_budget_keeps_unknown_prices() {
        let snapshot = snapshot();
        let c = HardConstraints {
            max_price: Some(42_000.0),
            ..constraints()
        };
        assert_eq!(admitted_ids(&snapshot, &c), vec![2, 3]);
    }

    #[test]
    fn test_relaxation_order() {
        let c = HardConstraints {
            capacity: Some(9),
            region: Some("jeju".to_string()),
            max_price: Some(10.0),
            ..constraints()
        };
        assert_eq!(
            c.active(),
            vec![RelaxedConstraint::Capacity, RelaxedConstraint::Region, RelaxedConstraint::StrictBudget]
        );
        assert_eq!(c.without(RelaxedConstraint::Region).region, None);
        assert_eq!(snapshot().count_admitted(&c), 0);
    }
}
