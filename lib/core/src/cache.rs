//! Per-facility embedding cache
//!
//! Entries are keyed by facility and stamped with a fingerprint of the text
//! they were computed from. A changed description changes the fingerprint,
//! which invalidates the entry on the next rebuild.

use crate::{FacilityId, Vector};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

/// SHA-256 over provider identity and document text, hex encoded
pub fn fingerprint(provider: &str, dimension: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_bytes());
    hasher.update([0u8]);
    hasher.update(dimension.to_le_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEmbedding {
    pub fingerprint: String,
    pub vector: Vector,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingCache {
    entries: BTreeMap<FacilityId, CachedEmbedding>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cached vector, only if it was computed from the same text
    pub fn get_fresh(&self, id: FacilityId, fingerprint: &str) -> Option<&Vector> {
        self.entries
            .get(&id)
            .filter(|entry| entry.fingerprint == fingerprint)
            .map(|entry| &entry.vector)
    }

    pub fn insert(&mut self, id: FacilityId, fingerprint: String, vector: Vector) {
        self.entries.insert(id, CachedEmbedding { fingerprint, vector });
    }

    /// Drop entries for facilities no longer in the repository.
    /// Returns how many were evicted.
    pub fn retain_ids(&mut self, live: &HashSet<FacilityId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id));
        before - self.entries.len()
    }
}
