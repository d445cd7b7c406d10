//! Per-directory strategy selection and recursion.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sizewise_core::{DirEntry, ScanConfig, ScanError};
use tracing::{debug, trace};

use crate::cancel::CancelSignal;
use crate::classify::is_small_file_heavy;
use crate::fs::{DirItem, FileSystem};

/// A resolved subtree plus the bytes that could not be accounted for inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// The subtree, children sorted by size descending.
    pub entry: DirEntry,
    /// Bytes that could not be read below this subtree.
    pub skipped: u64,
}

impl ScanResult {
    pub(crate) fn leaf(path: &Path, size: u64) -> Self {
        Self {
            entry: DirEntry::file(path, size),
            skipped: 0,
        }
    }
}

/// How a directory's children are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One child at a time on the current thread.
    Sequential,
    /// Children fanned out to a bounded set of pool tasks.
    Parallel,
    /// Files stat'ed in fixed-size batches, subdirectories scanned alongside.
    Batched,
}

/// Pick the strategy for a directory at `depth` with the given listing.
///
/// `max_depth` of 0 means the whole tree is displayed, which always favours fan-out.
pub fn choose_strategy(
    config: &ScanConfig,
    items: &[DirItem],
    depth: usize,
    max_depth: usize,
) -> Strategy {
    let len = items.len();
    if len > config.classify_min_entries && is_small_file_heavy(items, config) {
        return Strategy::Batched;
    }
    if max_depth == 0 || depth < config.parallel_depth || len > config.sequential_max_entries {
        Strategy::Parallel
    } else {
        Strategy::Sequential
    }
}

/// A child scheduled for scanning.
#[derive(Debug, Clone)]
pub(crate) struct WorkItem {
    pub(crate) path: PathBuf,
    pub(crate) listed_size: u64,
    pub(crate) is_dir: bool,
}

impl WorkItem {
    /// Symlinks and items whose listing probe failed are never scanned.
    pub(crate) fn from_listing(item: DirItem) -> Option<Self> {
        if item.stat.is_none() {
            trace!(path = %item.path.display(), "no metadata in listing, ignoring");
            return None;
        }
        if item.is_symlink() {
            return None;
        }
        Some(Self {
            listed_size: item.listed_size(),
            is_dir: item.is_dir(),
            path: item.path,
        })
    }

    /// Split a listing into `(files, directories)`.
    pub(crate) fn partition(items: Vec<DirItem>) -> (Vec<WorkItem>, Vec<WorkItem>) {
        items
            .into_iter()
            .filter_map(WorkItem::from_listing)
            .partition(|w| !w.is_dir)
    }
}

/// Accumulates resolved children of one directory.
#[derive(Debug, Default)]
pub(crate) struct ChildTally {
    children: Vec<DirEntry>,
    skipped: u64,
}

impl ChildTally {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            children: Vec::with_capacity(capacity),
            skipped: 0,
        }
    }

    /// Fold in the outcome of scanning `item`. A failed child counts its listing size
    /// as skipped.
    pub(crate) fn record(&mut self, item: &WorkItem, result: Result<ScanResult, ScanError>) {
        match result {
            Ok(res) => {
                self.skipped += res.skipped;
                self.children.push(res.entry);
            }
            Err(err) => {
                trace!(path = %item.path.display(), error = %err, "child skipped");
                self.skipped += item.listed_size;
            }
        }
    }

    pub(crate) fn push(&mut self, entry: DirEntry) {
        self.children.push(entry);
    }

    pub(crate) fn skip(&mut self, bytes: u64) {
        self.skipped += bytes;
    }

    pub(crate) fn merge(&mut self, other: ChildTally) {
        self.children.extend(other.children);
        self.skipped += other.skipped;
    }

    pub(crate) fn finish(self, path: &Path) -> ScanResult {
        ScanResult {
            entry: DirEntry::with_children(path, self.children),
            skipped: self.skipped,
        }
    }
}

/// Recursive scanner. Borrows everything it shares with its sibling tasks, so a single
/// walker serves a whole top-level scan.
pub(crate) struct Walker<'a> {
    pub(crate) fs: &'a dyn FileSystem,
    pub(crate) config: &'a ScanConfig,
    pub(crate) max_depth: usize,
    pub(crate) progress: &'a AtomicU64,
    pub(crate) cancel: &'a CancelSignal,
}

impl Walker<'_> {
    /// Scan `path`, found `depth` levels below the scan root.
    ///
    /// Only a failure to stat `path` itself, or a cancellation observed at this
    /// directory, is returned as an error. Anything unreadable further down is folded
    /// into [`ScanResult::skipped`].
    pub(crate) fn scan(&self, path: &Path, depth: usize) -> Result<ScanResult, ScanError> {
        let stat = self.fs.stat(path).map_err(|e| ScanError::io(path, e))?;

        if stat.is_symlink() {
            return Ok(ScanResult::leaf(path, 0));
        }
        if !stat.is_dir() {
            self.progress.fetch_add(stat.size, Ordering::Relaxed);
            return Ok(ScanResult::leaf(path, stat.size));
        }

        if self.cancel.is_pending() {
            return Err(ScanError::Interrupted);
        }

        let items = match self.fs.read_dir(path) {
            Ok(items) => items,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "cannot list directory");
                return Ok(ScanResult {
                    entry: DirEntry::directory(path),
                    skipped: stat.size,
                });
            }
        };

        let strategy = choose_strategy(self.config, &items, depth, self.max_depth);
        trace!(path = %path.display(), entries = items.len(), depth, ?strategy, "scanning directory");

        let result = match strategy {
            Strategy::Sequential => self.scan_sequential(path, items, depth),
            Strategy::Parallel => self.scan_parallel(path, items, depth),
            Strategy::Batched => self.scan_batched(path, items, depth),
        };

        if self.cancel.is_pending() {
            return Err(ScanError::Interrupted);
        }
        result
    }
}
