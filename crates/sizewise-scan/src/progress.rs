//! Scan progress reporting.

use std::time::Duration;

/// Snapshot of a running scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanProgress {
    /// File bytes accounted for so far.
    pub bytes_processed: u64,
    /// Time elapsed since the scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create a snapshot.
    pub fn new(bytes_processed: u64, elapsed: Duration) -> Self {
        Self {
            bytes_processed,
            elapsed,
        }
    }

    /// Calculate scan rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_processed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new(0, Duration::ZERO)
    }
}
