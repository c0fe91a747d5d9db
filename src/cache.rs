//! Content-addressed cache for prepared base tables.
//!
//! Loading is deterministic, so identical source bytes always prepare to
//! the identical table; the SHA-256 of the bytes is a sufficient key. Only
//! the most recent source version is kept.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::error::Result;
use crate::metrics::LoadMetrics;
use crate::pipeline::ingestion::csv_source::load_error;
use crate::pipeline::{prepare_base_table_from_bytes, BaseTable};

/// Hex-encoded SHA-256 of `bytes`
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Default)]
pub struct LoadCache {
    entries: Mutex<HashMap<String, Arc<BaseTable>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepared table for the current contents of `path`
    pub fn load(&self, path: &Path) -> Result<Arc<BaseTable>> {
        let bytes = std::fs::read(path).map_err(|e| {
            LoadMetrics::record_load_failure();
            load_error(path, e)
        })?;
        self.load_bytes(&bytes).map_err(|e| load_error(path, e))
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Arc<BaseTable>> {
        let key = content_key(bytes);
        if let Some(hit) = self.lock().get(&key) {
            debug!(key = %key, "Load cache hit");
            LoadMetrics::record_cache_hit();
            return Ok(Arc::clone(hit));
        }

        let base = Arc::new(prepare_base_table_from_bytes(bytes)?);
        let mut entries = self.lock();
        if !entries.is_empty() {
            debug!(evicted = entries.len(), "Replacing superseded source version");
            entries.clear();
        }
        entries.insert(key, Arc::clone(&base));
        Ok(base)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<BaseTable>>> {
        // entries are immutable once inserted, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
