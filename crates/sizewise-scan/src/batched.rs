//! Batched traversal for directories dominated by small files.

use std::path::Path;
use std::sync::atomic::Ordering;

use sizewise_core::{DirEntry, ScanError};
use tracing::debug;

use crate::fs::DirItem;
use crate::queue::WorkQueue;
use crate::walker::{ChildTally, ScanResult, Walker, WorkItem};

impl Walker<'_> {
    /// Stat files in fixed-size batches while subdirectories are scanned alongside.
    pub(crate) fn scan_batched(
        &self,
        path: &Path,
        items: Vec<DirItem>,
        depth: usize,
    ) -> Result<ScanResult, ScanError> {
        let entry_count = items.len();
        let (files, dirs) = WorkItem::partition(items);
        let batches = into_batches(files, self.config.batch_size);
        debug!(
            path = %path.display(),
            entries = entry_count,
            batches = batches.len(),
            subdirs = dirs.len(),
            "small-file-heavy directory"
        );

        let batch_queue = WorkQueue::new(batches);
        let dir_queue = WorkQueue::new(dirs);
        let (batch_tx, batch_rx) = crossbeam_channel::unbounded();
        let (dir_tx, dir_rx) = crossbeam_channel::unbounded();

        let batch_job = |batch: Vec<WorkItem>| self.scan_batch(batch, depth);
        let dir_job = |item: WorkItem| {
            let result = self.scan(&item.path, depth + 1);
            (item, result)
        };

        rayon::scope(|s| {
            batch_queue.spawn_workers(s, self.config.batch_workers(), self.cancel, &batch_tx, &batch_job);
            dir_queue.spawn_workers(s, self.config.batch_dir_workers(), self.cancel, &dir_tx, &dir_job);
        });
        drop(batch_tx);
        drop(dir_tx);

        if self.cancel.is_pending() {
            return Err(ScanError::Interrupted);
        }

        let mut tally = ChildTally::with_capacity(entry_count);
        for batch in batch_rx {
            tally.merge(batch);
        }
        for (item, result) in dir_rx {
            tally.record(&item, result);
        }
        Ok(tally.finish(path))
    }

    /// Stat one batch of files sequentially, publishing its byte total once.
    fn scan_batch(&self, batch: Vec<WorkItem>, depth: usize) -> ChildTally {
        let mut tally = ChildTally::with_capacity(batch.len());
        let mut subtotal = 0u64;

        for item in batch {
            if self.cancel.is_pending() {
                break;
            }
            match self.fs.stat(&item.path) {
                Ok(stat) if stat.is_symlink() => {}
                Ok(stat) if stat.is_dir() => {
                    let result = self.scan(&item.path, depth + 1);
                    tally.record(&item, result);
                }
                Ok(stat) => {
                    subtotal += stat.size;
                    tally.push(DirEntry::file(item.path, stat.size));
                }
                Err(_) => tally.skip(item.listed_size),
            }
        }

        self.progress.fetch_add(subtotal, Ordering::Relaxed);
        tally
    }
}

/// Split `items` into chunks of at most `size`, preserving order.
fn into_batches<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(size).collect());
    }
    batches
}
