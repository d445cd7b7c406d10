//! Concurrent directory scanning engine for sizewise.
//!
//! This crate measures directory trees and aggregates logical file sizes bottom-up.
//!
//! # Overview
//!
//! `sizewise-scan` picks a traversal strategy per directory from its listing:
//!
//! - **Sequential** for small, deep directories
//! - **Parallel** fan-out to a bounded set of tasks for shallow or wide directories
//! - **Batched** stat of fixed-size file batches for directories dominated by small files
//!
//! Every fan-out runs on one rayon pool owned by the [`ScanSession`], so the number of
//! threads stays bounded however deep and wide the tree is. Completed trees are cached
//! per path, a shared counter reports processed bytes while a scan runs, and a scan can
//! be cancelled at any time without leaving partial results behind.
//!
//! # Example
//!
//! ```rust,no_run
//! use sizewise_scan::{ScanConfig, ScanOutcome, ScanSession};
//!
//! let session = ScanSession::new(ScanConfig::default()).unwrap();
//! if let ScanOutcome::Complete(report) = session.scan("/path/to/scan", 2).unwrap() {
//!     println!("Total size: {} bytes", report.root.size);
//!     println!("Skipped: {} bytes", report.skipped);
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! Run the scan in the background and poll its progress:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sizewise_scan::{ScanConfig, ScanSession};
//!
//! let session = Arc::new(ScanSession::new(ScanConfig::default()).unwrap());
//! let mut handle = session.spawn("/path/to/scan", 0).unwrap();
//!
//! let outcome = loop {
//!     if let Some(outcome) = handle.wait_timeout(Duration::from_millis(100)) {
//!         break outcome;
//!     }
//!     println!("Scanned {} bytes", handle.progress().bytes_processed);
//! };
//! ```

mod batched;
mod cache;
mod cancel;
mod classify;
mod estimate;
mod fs;
#[cfg(test)]
mod memfs;
mod parallel;
mod progress;
mod queue;
mod sequential;
mod session;
mod walker;

pub use cache::DirEntryCache;
pub use cancel::CancelSignal;
pub use classify::is_small_file_heavy;
pub use estimate::estimate_directory_size;
pub use fs::{DirItem, FileSystem, StdFs};
pub use progress::ScanProgress;
pub use session::{ScanHandle, ScanOutcome, ScanReport, ScanSession};
pub use walker::{ScanResult, Strategy, choose_strategy};

// Re-export core types for convenience
pub use sizewise_core::{DirEntry, EntryKind, ScanConfig, ScanConfigBuilder, ScanError, Stat};
