//! Search path selection
//!
//! Which path serves a request is decided up front from two facts: whether
//! the embedding provider came up at startup, and whether an index has been
//! built. Nothing is retried per request.

use crate::response::{FallbackReason, SearchPathKind};
use hyurim_core::{EmbeddingProvider, ProviderStatus};
use serde::Serialize;

/// Capabilities checked once when the engine starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub provider: ProviderStatus,
}

impl Capabilities {
    pub fn detect(provider: &dyn EmbeddingProvider) -> Self {
        let provider = ProviderStatus::check(provider);
        tracing::info!(available = provider.is_available(), "embedding provider checked");
        Self { provider }
    }

    pub fn embeddings_available(&self) -> bool {
        self.provider.is_available()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPath {
    Vector,
    Fallback(FallbackReason),
}

impl SearchPath {
    pub fn kind(&self) -> SearchPathKind {
        match self {
            SearchPath::Vector => SearchPathKind::Vector,
            SearchPath::Fallback(_) => SearchPathKind::Fallback,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            SearchPath::Vector => None,
            SearchPath::Fallback(reason) => Some(*reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SearchPath::Fallback(_))
    }
}

/// Choose the path for one request. Provider availability is checked first.
pub fn select_path(embeddings_available: bool, index_built: bool) -> SearchPath {
    match (embeddings_available, index_built) {
        (false, _) => SearchPath::Fallback(FallbackReason::ProviderUnavailable),
        (true, false) => SearchPath::Fallback(FallbackReason::IndexNotBuilt),
        (true, true) => SearchPath::Vector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyurim_core::{DisabledEmbedder, HashingEmbedder};

    #[test]
    fn test_select_path_table() {
        assert_eq!(select_path(true, true), SearchPath::Vector);
        assert_eq!(select_path(true, false), SearchPath::Fallback(FallbackReason::IndexNotBuilt));
        assert_eq!(select_path(false, true), SearchPath::Fallback(FallbackReason::ProviderUnavailable));
        assert_eq!(select_path(false, false), SearchPath::Fallback(FallbackReason::ProviderUnavailable));
        assert!(select_path(false, false).is_degraded());
        assert_eq!(select_path(true, true).kind(), SearchPathKind::Vector);
    }

    #[test]
    fn test_capabilities_detect() {
        assert!(Capabilities::detect(&HashingEmbedder::new(8)).embeddings_available());
        assert!(!Capabilities::detect(&DisabledEmbedder::new("off")).embeddings_available());
    }
}
