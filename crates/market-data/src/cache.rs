//! Injected response caches. The store is a plain keyed map: exact-key hits
//! or misses, no eviction, no expiry.

use analysis_core::{AnalysisError, ResponseCache};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

/// On-disk JSON store, one file per key. Keys are hashed so tickers and
/// sub-resource names never have to be filesystem-safe.
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AnalysisError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            AnalysisError::CacheError(format!("cannot create cache dir {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.dir.join(format!("{digest}.json"))
    }
}

impl ResponseCache for DiskCache {
    fn get(&self, key: &str) -> Option<Value> {
        let bytes = fs::read(self.path_for(key)).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("discarding corrupt cache entry for {key}: {e}");
                None
            }
        }
    }

    fn put(&self, key: &str, value: &Value) {
        let path = self.path_for(key);
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("cannot serialize cache entry for {key}: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(&path, bytes) {
            tracing::warn!("cache write failed for {key} at {}: {e}", path.display());
        }
    }
}

/// Cache that stores nothing: every lookup is a miss.
pub struct NoopCache;

impl ResponseCache for NoopCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn put(&self, _key: &str, _value: &Value) {}
}
