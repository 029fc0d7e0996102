//! Discount adjuster
//!
//! Picks the single lodging policy that saves the user the most. Policies
//! never stack. Equal savings go to the policy with the lowest id.

use hyurim_core::{DiscountPolicy, FacilityRecord, PolicyCategory, PolicyId, UserAttributes};
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedDiscount {
    pub effective_price: u64,
    pub policy_id: Option<PolicyId>,
    pub discount_amount: u64,
}

impl AppliedDiscount {
    fn none(base_price: u64) -> Self {
        Self {
            effective_price: base_price,
            policy_id: None,
            discount_amount: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountAdjuster;

impl DiscountAdjuster {
    pub fn new() -> Self {
        Self
    }

    /// Effective price of `facility` at `base_price` for a user with `attrs`.
    ///
    /// Only lodging policies of the facility's own forest whose every
    /// condition holds are considered. An unknown (zero) base price is
    /// left untouched.
    pub fn apply<'a, I>(
        &self,
        facility: &FacilityRecord,
        base_price: u64,
        policies: I,
        attrs: &UserAttributes,
    ) -> AppliedDiscount
    where
        I: IntoIterator<Item = &'a DiscountPolicy>,
    {
        if base_price == 0 {
            return AppliedDiscount::none(base_price);
        }

        let best = policies
            .into_iter()
            .filter(|p| p.forest_id == facility.forest_id)
            .filter(|p| p.policy_category == PolicyCategory::Lodging)
            .filter(|p| p.is_satisfied_by(attrs))
            .map(|p| (p.reduction_for(base_price), p.id))
            .max_by_key(|&(reduction, id)| (reduction, Reverse(id)));

        match best {
            Some((reduction, id)) => {
                tracing::debug!(facility = %facility.id, policy = %id, reduction, "discount applied");
                AppliedDiscount {
                    effective_price: base_price - reduction,
                    policy_id: Some(id),
                    discount_amount: reduction,
                }
            }
            None => AppliedDiscount::none(base_price),
        }
    }
}
