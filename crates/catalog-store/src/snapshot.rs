//! JSON snapshots of an [`InMemoryCatalogStore`].
//!
//! Snapshots let the in-memory backend survive process restarts (the
//! `catalog` binary keeps its state in one JSON file). Writes go to a
//! sibling temporary file first and are renamed into place.

use std::fs;
use std::path::Path;

use catalog_types::{Bucket, CatalogObject, CatalogObjectRevision};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryCatalogStore;

/// Serializable image of the full store contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub buckets: Vec<Bucket>,
    pub objects: Vec<CatalogObject>,
    pub revisions: Vec<CatalogObjectRevision>,
    /// Next object id the store hands out.
    pub next_object_id: u64,
}

impl CatalogSnapshot {
    pub fn to_json(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_json(bytes: &[u8]) -> StoreResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl InMemoryCatalogStore {
    /// Write the store contents to `path` as JSON.
    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        let bytes = self.snapshot()?.to_json()?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "catalog snapshot written");
        Ok(())
    }

    /// Load a store from a JSON snapshot at `path`.
    ///
    /// A missing file yields an empty store.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let bytes = fs::read(path)?;
        Self::from_snapshot(CatalogSnapshot::from_json(&bytes)?)
    }
}
