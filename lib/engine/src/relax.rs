//! Constraint relaxation for requests nothing satisfies
//!
//! Constraints are dropped cumulatively in a fixed order: capacity, then
//! region, then budget strictness. The first prefix that admits at least
//! one facility is the plan.

use crate::response::{RelaxationHint, RelaxedConstraint};
use crate::snapshot::{CatalogSnapshot, HardConstraints};

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationPlan {
    pub dropped: Vec<RelaxedConstraint>,
    pub constraints: HardConstraints,
    pub matching_candidates: usize,
}

/// Shortest relaxation that admits a facility, if any does
pub fn plan_relaxation(snapshot: &CatalogSnapshot, constraints: &HardConstraints) -> Option<RelaxationPlan> {
    let mut relaxed = constraints.clone();
    let mut dropped = Vec::new();

    for constraint in constraints.active() {
        relaxed = relaxed.without(constraint);
        dropped.push(constraint);

        let matching_candidates = snapshot.count_admitted(&relaxed);
        if matching_candidates > 0 {
            return Some(RelaxationPlan {
                dropped,
                constraints: relaxed,
                matching_candidates,
            });
        }
    }

    None
}

pub fn hint(plan: Option<&RelaxationPlan>, applied: bool) -> RelaxationHint {
    match plan {
        Some(plan) => {
            let names: Vec<&str> = plan.dropped.iter().map(RelaxedConstraint::as_str).collect();
            let message = if applied {
                format!(
                    "No facility matched every constraint; showing results without {}",
                    names.join(", ")
                )
            } else {
                format!(
                    "No facility matched every constraint; dropping {} would match {} facilities",
                    names.join(", "),
                    plan.matching_candidates
                )
            };
            RelaxationHint {
                message,
                dropped: plan.dropped.clone(),
                matching_candidates: plan.matching_candidates,
                applied,
            }
        }
        None => RelaxationHint {
            message: "No facility matched, and relaxing constraints would not help".to_string(),
            dropped: Vec::new(),
            matching_candidates: 0,
            applied: false,
        },
    }
}
