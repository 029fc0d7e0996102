// Persisted embedding cache
//
// File layout: a bincode envelope holding a format version, a save timestamp,
// the SHA-256 of the payload and the payload itself (a bincode EmbeddingCache).
// Writes go through atomicwrites, so a crash never leaves a torn file.
use anyhow::{anyhow, bail, Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use chrono::{DateTime, Utc};
use hyurim_core::EmbeddingCache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreEnvelope {
    version: u32,
    saved_at: DateTime<Utc>,
    checksum: String,
    payload: Vec<u8>,
}

/// Description of a saved cache file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDescription {
    pub path: PathBuf,
    pub entries: usize,
    pub size: u64,
    pub checksum: String,
    pub saved_at: DateTime<Utc>,
}

pub struct EmbeddingStore {
    path: PathBuf,
}

impl EmbeddingStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `cache` to disk, replacing any previous file atomically
    pub fn save(&self, cache: &EmbeddingCache) -> Result<StoreDescription> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let payload = bincode::serialize(cache).map_err(|e| anyhow!("Serialization error: {}", e))?;
        let checksum = format!("{:x}", Sha256::digest(&payload));
        let envelope = StoreEnvelope {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            checksum,
            payload,
        };
        let data = bincode::serialize(&envelope).map_err(|e| anyhow!("Serialization error: {}", e))?;

        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(&data))
            .with_context(|| format!("Failed to write embedding cache {:?}", self.path))?;

        let description = StoreDescription {
            path: self.path.clone(),
            entries: cache.len(),
            size: data.len() as u64,
            checksum: envelope.checksum,
            saved_at: envelope.saved_at,
        };
        tracing::info!(path = ?description.path, entries = description.entries, "embedding cache saved");
        Ok(description)
    }

    /// Read the cache back. `Ok(None)` when no file exists yet.
    pub fn load(&self) -> Result<Option<EmbeddingCache>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read(&self.path).with_context(|| format!("Failed to read embedding cache {:?}", self.path))?;
        let envelope: StoreEnvelope =
            bincode::deserialize(&data).map_err(|e| anyhow!("Deserialization error: {}", e))?;

        if envelope.version != FORMAT_VERSION {
            bail!(
                "Unsupported embedding cache version {} (expected {})",
                envelope.version,
                FORMAT_VERSION
            );
        }
        let checksum = format!("{:x}", Sha256::digest(&envelope.payload));
        if checksum != envelope.checksum {
            bail!("Embedding cache checksum mismatch in {:?}", self.path);
        }

        let cache: EmbeddingCache =
            bincode::deserialize(&envelope.payload).map_err(|e| anyhow!("Deserialization error: {}", e))?;
        tracing::info!(
            path = ?self.path,
            entries = cache.len(),
            saved_at = %envelope.saved_at.format("%Y-%m-%dT%H:%M:%SZ"),
            "embedding cache loaded"
        );
        Ok(Some(cache))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyurim_core::{fingerprint, FacilityId, Vector};
    use tempfile::tempdir;

    fn cache() -> EmbeddingCache {
        let mut cache = EmbeddingCache::new();
        cache.insert(FacilityId(1), fingerprint("p", 3, "a"), Vector::new(vec![1.0, 0.0, 0.0]));
        cache.insert(FacilityId(2), fingerprint("p", 3, "b"), Vector::new(vec![0.0, 0.6, 0.8]));
        cache
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let store = EmbeddingStore::new(dir.path().join("embeddings.bin"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = EmbeddingStore::new(dir.path().join("nested").join("embeddings.bin"));

        let description = store.save(&cache()).unwrap();
        assert_eq!(description.entries, 2);
        assert_eq!(description.checksum.len(), 64);

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, cache());

        // overwrite in place
        store.save(&EmbeddingCache::new()).unwrap();
        assert!(store.load().unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("embeddings.bin");
        let store = EmbeddingStore::new(&path);
        store.save(&cache()).unwrap();

        let mut data = fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        fs::write(&path, data).unwrap();

        assert!(store.load().is_err());
    }
}
