//! Single-threaded child traversal.

use std::path::Path;

use sizewise_core::ScanError;

use crate::fs::DirItem;
use crate::walker::{ChildTally, ScanResult, Walker, WorkItem};

impl Walker<'_> {
    /// Visit children one at a time in listing order.
    pub(crate) fn scan_sequential(
        &self,
        path: &Path,
        items: Vec<DirItem>,
        depth: usize,
    ) -> Result<ScanResult, ScanError> {
        let mut tally = ChildTally::with_capacity(items.len());

        for item in items.into_iter().filter_map(WorkItem::from_listing) {
            if self.cancel.is_pending() {
                return Err(ScanError::Interrupted);
            }
            let result = self.scan(&item.path, depth + 1);
            tally.record(&item, result);
        }

        Ok(tally.finish(path))
    }
}
