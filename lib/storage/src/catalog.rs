// JSON catalog loading
use anyhow::{bail, Context, Result};
use hyurim_core::{Catalog, DiscountType, InMemoryRepository};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Read a catalog document `{forests, facilities, discount_policies}`.
///
/// Duplicate ids are rejected. Dangling forest references and out-of-range
/// rates are logged but kept: the engine tolerates both.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("Failed to read catalog {:?}", path))?;
    let catalog: Catalog =
        serde_json::from_slice(&data).with_context(|| format!("Failed to parse catalog {:?}", path))?;
    check_catalog(&catalog)?;
    Ok(catalog)
}

pub fn load_repository<P: AsRef<Path>>(path: P) -> Result<InMemoryRepository> {
    let catalog = load_catalog(path)?;
    tracing::info!(
        forests = catalog.forests.len(),
        facilities = catalog.facilities.len(),
        policies = catalog.discount_policies.len(),
        "catalog loaded"
    );
    Ok(InMemoryRepository::new(catalog))
}

fn check_catalog(catalog: &Catalog) -> Result<()> {
    let mut forest_ids = HashSet::new();
    for forest in &catalog.forests {
        if !forest_ids.insert(&forest.id) {
            bail!("Duplicate forest id {}", forest.id);
        }
    }

    let mut facility_ids = HashSet::new();
    for facility in &catalog.facilities {
        if !facility_ids.insert(facility.id) {
            bail!("Duplicate facility id {}", facility.id);
        }
        if !forest_ids.contains(&facility.forest_id) {
            tracing::warn!(facility = %facility.id, forest = %facility.forest_id, "facility references an unknown forest");
        }
    }

    let mut policy_ids = HashSet::new();
    for policy in &catalog.discount_policies {
        if !policy_ids.insert(policy.id) {
            bail!("Duplicate discount policy id {}", policy.id);
        }
        if policy.discount_type == DiscountType::Percentage && !(0.0..=100.0).contains(&policy.discount_rate) {
            tracing::warn!(policy = %policy.id, rate = policy.discount_rate, "discount rate outside 0-100, will be clamped");
        }
        if policy.discount_type == DiscountType::FixedAmount && policy.discount_amount.is_none() {
            tracing::warn!(policy = %policy.id, "fixed-amount policy without an amount");
        }
    }

    Ok(())
}
