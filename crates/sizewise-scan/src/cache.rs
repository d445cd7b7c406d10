//! Cache of completed scan results.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use sizewise_core::DirEntry;

/// Completed subtrees keyed by absolute path.
///
/// Entries are immutable snapshots shared behind an [`Arc`]; a cached tree is never
/// refreshed, only dropped by [`clear`](Self::clear). There is no eviction.
#[derive(Debug, Default)]
pub struct DirEntryCache {
    entries: RwLock<HashMap<PathBuf, Arc<DirEntry>>>,
}

impl DirEntryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the tree cached for `path`.
    pub fn get(&self, path: &Path) -> Option<Arc<DirEntry>> {
        self.entries.read().get(path).cloned()
    }

    /// Store `entry` as the tree for `path`, replacing any previous one.
    pub fn set(&self, path: impl Into<PathBuf>, entry: impl Into<Arc<DirEntry>>) {
        self.entries.write().insert(path.into(), entry.into());
    }

    /// Check whether `path` has a cached tree.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.read().contains_key(path)
    }

    /// Drop every cached tree.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached trees.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
