//! Scan sessions: the shared pool, cache, progress counter and cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use parking_lot::Mutex;
use sizewise_core::{DirEntry, ScanConfig, ScanError, skipped_percent};
use tracing::{debug, info};

use crate::cache::DirEntryCache;
use crate::cancel::CancelSignal;
use crate::estimate::estimate_directory_size;
use crate::fs::{FileSystem, StdFs};
use crate::progress::ScanProgress;
use crate::walker::Walker;

/// Stack size for pool threads. Nested fan-out recurses on the worker stacks.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Result of a completed top-level scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// The scanned tree.
    pub root: Arc<DirEntry>,
    /// Bytes that could not be read.
    pub skipped: u64,
    /// Whether the tree came from the session cache.
    pub from_cache: bool,
    /// Wall time of the scan.
    pub duration: Duration,
}

impl ScanReport {
    /// Skipped bytes as a percentage of everything seen.
    pub fn skipped_percent(&self) -> f64 {
        skipped_percent(self.root.size, self.skipped)
    }
}

/// How a top-level scan ended.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// The scan ran to completion.
    Complete(ScanReport),
    /// The scan was cancelled; nothing was cached.
    Cancelled,
}

impl ScanOutcome {
    /// Check if the scan was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanOutcome::Cancelled)
    }

    /// The report of a completed scan.
    pub fn report(self) -> Option<ScanReport> {
        match self {
            ScanOutcome::Complete(report) => Some(report),
            ScanOutcome::Cancelled => None,
        }
    }
}

/// Long-lived scanning context.
///
/// A session owns one bounded worker pool shared by every fan-out of every scan it runs,
/// the cache of completed trees, the processed-bytes counter and the cancellation signal.
/// Top-level scans on one session are expected to run one at a time: starting a scan
/// resets the counter and drains any pending cancellation.
pub struct ScanSession {
    config: ScanConfig,
    fs: Arc<dyn FileSystem>,
    pool: rayon::ThreadPool,
    cache: DirEntryCache,
    processed: AtomicU64,
    cancel: CancelSignal,
    in_flight: AtomicUsize,
    /// Held while a scan settles its outcome and while the cache is cleared.
    commit: Mutex<()>,
}

impl ScanSession {
    /// Create a session scanning the real filesystem.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        Self::with_fs(config, Arc::new(StdFs))
    }

    /// Create a session over a custom [`FileSystem`].
    pub fn with_fs(config: ScanConfig, fs: Arc<dyn FileSystem>) -> Result<Self, ScanError> {
        let threads = config.pool_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sizewise-scan-{i}"))
            .stack_size(WORKER_STACK_SIZE)
            .build()
            .map_err(|e| ScanError::ThreadPool {
                message: e.to_string(),
            })?;
        debug!(threads, "scan pool started");

        Ok(Self {
            config,
            fs,
            pool,
            cache: DirEntryCache::new(),
            processed: AtomicU64::new(0),
            cancel: CancelSignal::new(),
            in_flight: AtomicUsize::new(0),
            commit: Mutex::new(()),
        })
    }

    /// The session configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The cache of completed trees.
    pub fn cache(&self) -> &DirEntryCache {
        &self.cache
    }

    /// Bytes accounted for by the current scan so far.
    pub fn processed_bytes(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Check whether a scan is running.
    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Ask the running scan to stop. Never blocks; repeated requests collapse into one.
    pub fn request_cancel(&self) -> bool {
        self.cancel.request()
    }

    /// Drain a pending cancellation without waiting for anything.
    pub fn reset_cancel(&self) -> bool {
        self.cancel.reset()
    }

    /// Drop every cached tree, cancelling a running scan first so it cannot repopulate
    /// the cache.
    ///
    /// A scan that has already stored its tree by the time this runs is no longer
    /// counted as running and is left alone.
    pub fn clear_cache(&self) {
        let _commit = self.commit.lock();
        if self.is_scanning() {
            self.cancel.request();
        }
        self.cache.clear();
        info!("scan cache cleared");
    }

    /// Scan `path` on the calling thread, blocking until the tree is complete or the
    /// scan is cancelled.
    ///
    /// `max_display_depth` is the number of levels the caller intends to present
    /// (0 = all). It steers strategy selection and never limits traversal.
    pub fn scan(
        &self,
        path: impl AsRef<Path>,
        max_display_depth: usize,
    ) -> Result<ScanOutcome, ScanError> {
        self.begin();
        self.run(path.as_ref(), max_display_depth)
    }

    /// Start a scan on a background thread.
    pub fn spawn(
        self: &Arc<Self>,
        path: impl Into<PathBuf>,
        max_display_depth: usize,
    ) -> Result<ScanHandle, ScanError> {
        self.begin();
        let path = path.into();
        let session = Arc::clone(self);
        let (tx, rx) = crossbeam_channel::bounded(1);

        let thread = thread::Builder::new()
            .name("sizewise-session".into())
            .spawn(move || {
                let outcome = session.run(&path, max_display_depth);
                let _ = tx.send(outcome);
            })
            .map_err(|e| ScanError::ThreadPool {
                message: e.to_string(),
            })?;

        Ok(ScanHandle {
            session: Arc::clone(self),
            outcome: rx,
            started: Instant::now(),
            thread: Some(thread),
        })
    }

    /// Estimate the size of the immediate entries of `path` by sampling.
    pub fn estimate(&self, path: impl AsRef<Path>, sample_size: usize) -> Result<u64, ScanError> {
        estimate_directory_size(self.fs.as_ref(), path.as_ref(), sample_size)
    }

    fn begin(&self) {
        self.cancel.reset();
        self.processed.store(0, Ordering::Relaxed);
    }

    fn run(&self, path: &Path, max_display_depth: usize) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();
        let path = self.fs.canonicalize(path).map_err(|e| ScanError::io(path, e))?;

        if let Some(root) = self.cache.get(&path) {
            debug!(path = %path.display(), size = root.size, "cache hit");
            self.processed.fetch_add(root.size, Ordering::Relaxed);
            return Ok(ScanOutcome::Complete(ScanReport {
                root,
                skipped: 0,
                from_cache: true,
                duration: start.elapsed(),
            }));
        }

        let guard = InFlight::enter(&self.in_flight);
        info!(path = %path.display(), "scan started");

        let walker = Walker {
            fs: self.fs.as_ref(),
            config: &self.config,
            max_depth: max_display_depth,
            progress: &self.processed,
            cancel: &self.cancel,
        };
        let result = self.pool.install(|| walker.scan(&path, 0));

        // Checking for cancellation, storing the tree and leaving the in-flight count
        // happen as one step with respect to `clear_cache`.
        let commit = self.commit.lock();
        if self.cancel.reset() {
            drop(guard);
            drop(commit);
            info!(path = %path.display(), "scan cancelled");
            return Ok(ScanOutcome::Cancelled);
        }
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                drop(guard);
                return Err(err);
            }
        };
        let root = Arc::new(result.entry);
        self.cache.set(path.clone(), Arc::clone(&root));
        drop(guard);
        drop(commit);

        let duration = start.elapsed();
        info!(
            path = %path.display(),
            size = root.size,
            skipped = result.skipped,
            elapsed_ms = duration.as_millis() as u64,
            "scan finished"
        );

        Ok(ScanOutcome::Complete(ScanReport {
            root,
            skipped: result.skipped,
            from_cache: false,
            duration,
        }))
    }
}

/// Counts a running scan for as long as it is alive.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Handle to a scan running on a background thread.
pub struct ScanHandle {
    session: Arc<ScanSession>,
    outcome: Receiver<Result<ScanOutcome, ScanError>>,
    started: Instant,
    thread: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Current progress snapshot.
    pub fn progress(&self) -> ScanProgress {
        ScanProgress::new(self.session.processed_bytes(), self.started.elapsed())
    }

    /// Ask the scan to stop. It winds down at the next directory boundary.
    pub fn cancel(&self) -> bool {
        self.session.request_cancel()
    }

    /// The outcome, if the scan has finished.
    pub fn try_outcome(&mut self) -> Option<Result<ScanOutcome, ScanError>> {
        match self.outcome.try_recv() {
            Ok(outcome) => {
                self.join();
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(lost_thread())),
        }
    }

    /// Wait up to `timeout` for the outcome.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<ScanOutcome, ScanError>> {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => {
                self.join();
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(lost_thread())),
        }
    }

    /// Block until the scan finishes.
    pub fn wait(mut self) -> Result<ScanOutcome, ScanError> {
        let outcome = self.outcome.recv().map_err(|_| lost_thread())?;
        self.join();
        outcome
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn lost_thread() -> ScanError {
    ScanError::Other {
        message: "scan thread exited without a result".into(),
    }
}
