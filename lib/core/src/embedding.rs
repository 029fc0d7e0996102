//! Embedding providers
//!
//! A provider turns text into a fixed-length vector. Availability is a
//! session-level property: a provider that cannot be loaded stays unavailable
//! for the lifetime of the process, so callers check once and keep the verdict.

use crate::tokenize::tokenize;
use crate::{Error, Result, Vector};
use serde::Serialize;
use std::hash::BuildHasher;

/// Default dimension for hashed text embeddings
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

pub trait EmbeddingProvider: Send + Sync {
    /// Stable name, part of every cache fingerprint
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// One-time availability check
    fn check(&self) -> Result<()>;

    /// Deterministic for identical input
    fn embed(&self, text: &str) -> Result<Vector>;
}

/// Outcome of the startup availability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    Available { provider: String, dimension: usize },
    Unavailable { reason: String },
}

impl ProviderStatus {
    pub fn check(provider: &dyn EmbeddingProvider) -> Self {
        match provider.check() {
            Ok(()) => ProviderStatus::Available {
                provider: provider.name().to_string(),
                dimension: provider.dimension(),
            },
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "embedding provider unavailable");
                ProviderStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ProviderStatus::Available { .. })
    }
}

/// Feature-hashing embedder over words and character trigrams.
///
/// All components are non-negative, so cosine similarity between two
/// embeddings stays in [0, 1].
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
    hasher: ahash::RandomState,
}

impl HashingEmbedder {
    const NAME: &'static str = "hashing-v1";
    const WORD_WEIGHT: f32 = 2.0;
    const TRIGRAM_WEIGHT: f32 = 1.0;

    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            // fixed seeds keep vectors reproducible across runs
            hasher: ahash::RandomState::with_seeds(
                0x6879_7572_696d_0001,
                0x6879_7572_696d_0002,
                0x6879_7572_696d_0003,
                0x6879_7572_696d_0004,
            ),
        }
    }

    fn bucket(&self, feature: &str) -> usize {
        (self.hasher.hash_one(feature) as usize) % self.dim
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn check(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(Error::ProviderUnavailable(
                "hashing embedder configured with zero dimension".to_string(),
            ));
        }
        Ok(())
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        self.check()?;

        let mut vector = Vector::zeros(self.dim);
        let data = vector.as_mut_slice();

        for token in tokenize(text) {
            data[self.bucket(&token)] += Self::WORD_WEIGHT;
            for trigram in trigrams(&token) {
                data[self.bucket(&trigram)] += Self::TRIGRAM_WEIGHT;
            }
        }

        vector.normalize();
        Ok(vector)
    }
}

/// Character trigrams of a token padded with one space on each side
fn trigrams(token: &str) -> Vec<String> {
    let padded: Vec<char> = std::iter::once(' ')
        .chain(token.chars())
        .chain(std::iter::once(' '))
        .collect();
    padded.windows(3).map(|w| w.iter().collect()).collect()
}

/// Provider that is never available.
///
/// Stands in when semantic search is switched off or its backing model
/// cannot be loaded; the engine then serves every request from the fallback scorer.
#[derive(Debug, Clone)]
pub struct DisabledEmbedder {
    reason: String,
}

impl DisabledEmbedder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl EmbeddingProvider for DisabledEmbedder {
    fn name(&self) -> &str {
        "disabled"
    }

    fn dimension(&self) -> usize {
        0
    }

    fn check(&self) -> Result<()> {
        Err(Error::ProviderUnavailable(self.reason.clone()))
    }

    fn embed(&self, _text: &str) -> Result<Vector> {
        Err(Error::ProviderUnavailable(self.reason.clone()))
    }
}
