//! Bounded fan-out over a directory's children.

use std::path::Path;

use sizewise_core::ScanError;
use tracing::trace;

use crate::fs::DirItem;
use crate::queue::fan_out;
use crate::walker::{ChildTally, ScanResult, Walker, WorkItem};

impl Walker<'_> {
    /// Fan children out to pool tasks. Files are queued ahead of subdirectories.
    pub(crate) fn scan_parallel(
        &self,
        path: &Path,
        items: Vec<DirItem>,
        depth: usize,
    ) -> Result<ScanResult, ScanError> {
        if items.len() < self.config.parallel_min_entries {
            return self.scan_sequential(path, items, depth);
        }

        let workers = self.config.worker_count(items.len());
        let (files, dirs) = WorkItem::partition(items);
        let mut queue = files;
        queue.extend(dirs);
        trace!(path = %path.display(), queued = queue.len(), workers, "fanning out");

        let results = fan_out(queue, workers, self.cancel, |item| {
            let result = self.scan(&item.path, depth + 1);
            (item, result)
        });

        if self.cancel.is_pending() {
            return Err(ScanError::Interrupted);
        }

        let mut tally = ChildTally::with_capacity(results.len());
        for (item, result) in results {
            tally.record(&item, result);
        }
        Ok(tally.finish(path))
    }
}
