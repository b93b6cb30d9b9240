use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::debug;

use crate::{facility::FacilityCatalog, DiagResult};

/// Caller-owned cache of parsed facility catalogs, keyed by catalog path.
///
/// Entries are immutable once built; clones of the cache share the same map.
/// Nothing is refreshed behind the caller's back: call [`FacilityCache::reload`]
/// or [`FacilityCache::invalidate`] after the file changes. Failed loads are
/// never cached.
#[derive(Debug, Clone, Default)]
pub struct FacilityCache {
    catalogs: Arc<RwLock<HashMap<PathBuf, Arc<FacilityCatalog>>>>,
}

impl FacilityCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached catalog for `path`, loading it on first use.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> DiagResult<Arc<FacilityCatalog>> {
        let path = path.as_ref();
        if let Some(catalog) = self.catalogs.read().get(path) {
            return Ok(Arc::clone(catalog));
        }
        let loaded = Arc::new(FacilityCatalog::load(path)?);
        let mut catalogs = self.catalogs.write();
        // another caller may have loaded it while the lock was released
        let catalog = catalogs.entry(path.to_path_buf()).or_insert(loaded);
        Ok(Arc::clone(catalog))
    }

    /// Re-reads `path`, replacing any cached entry.
    ///
    /// On failure the previous entry is dropped as well.
    pub fn reload(&self, path: impl AsRef<Path>) -> DiagResult<Arc<FacilityCatalog>> {
        let path = path.as_ref();
        self.invalidate(path);
        debug!(path = %path.display(), "reloading facility catalog");
        let loaded = Arc::new(FacilityCatalog::load(path)?);
        self.catalogs
            .write()
            .insert(path.to_path_buf(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drops the entry for `path`; returns whether one existed.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        self.catalogs.write().remove(path.as_ref()).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.catalogs.write().clear();
    }

    /// Whether a catalog for `path` is cached.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.catalogs.read().contains_key(path.as_ref())
    }

    /// Number of cached catalogs.
    pub fn len(&self) -> usize {
        self.catalogs.read().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.catalogs.read().is_empty()
    }
}
