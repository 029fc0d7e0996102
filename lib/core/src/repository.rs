//! Read-only repository seams
//!
//! The engine reads facilities, forests and discount policies through these
//! traits and never writes back. `InMemoryRepository` serves all three from
//! one loaded [`Catalog`].

use crate::{Catalog, DiscountPolicy, Error, FacilityId, FacilityRecord, ForestId, ForestRecord, Result};
use parking_lot::RwLock;
use std::sync::Arc;

pub trait FacilityRepository: Send + Sync {
    fn list_facilities(&self) -> Result<Vec<FacilityRecord>>;

    fn get_facility(&self, id: FacilityId) -> Result<FacilityRecord>;

    fn list_forests(&self) -> Result<Vec<ForestRecord>>;

    fn get_forest(&self, id: &ForestId) -> Result<Option<ForestRecord>>;
}

pub trait DiscountPolicyRepository: Send + Sync {
    fn list_policies(&self) -> Result<Vec<DiscountPolicy>>;

    fn policies_for_forest(&self, forest_id: &ForestId) -> Result<Vec<DiscountPolicy>> {
        Ok(self
            .list_policies()?
            .into_iter()
            .filter(|p| &p.forest_id == forest_id)
            .collect())
    }
}

/// Catalog-backed repository; `replace` swaps the whole catalog at once
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    catalog: RwLock<Arc<Catalog>>,
}

impl InMemoryRepository {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn replace(&self, catalog: Catalog) {
        *self.catalog.write() = Arc::new(catalog);
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }
}

impl FacilityRepository for InMemoryRepository {
    fn list_facilities(&self) -> Result<Vec<FacilityRecord>> {
        Ok(self.catalog().facilities.clone())
    }

    fn get_facility(&self, id: FacilityId) -> Result<FacilityRecord> {
        self.catalog()
            .facilities
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(Error::FacilityNotFound(id))
    }

    fn list_forests(&self) -> Result<Vec<ForestRecord>> {
        Ok(self.catalog().forests.clone())
    }

    fn get_forest(&self, id: &ForestId) -> Result<Option<ForestRecord>> {
        Ok(self.catalog().forests.iter().find(|f| &f.id == id).cloned())
    }
}

impl DiscountPolicyRepository for InMemoryRepository {
    fn list_policies(&self) -> Result<Vec<DiscountPolicy>> {
        Ok(self.catalog().discount_policies.clone())
    }
}
