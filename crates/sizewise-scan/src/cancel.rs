//! Single-slot cancellation signal.

use std::sync::atomic::{AtomicBool, Ordering};

/// A cancellation request that can be raised any number of times but holds at most one
/// pending signal.
///
/// Scanners poll [`is_pending`](Self::is_pending) at directory boundaries and between
/// work items; the session consumes the signal with [`reset`](Self::reset) when a scan
/// ends.
#[derive(Debug, Default)]
pub struct CancelSignal {
    pending: AtomicBool,
}

impl CancelSignal {
    /// Create a signal with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Never blocks.
    ///
    /// Returns `true` if the signal was newly raised, `false` if one was already pending.
    pub fn request(&self) -> bool {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Check whether a cancellation is pending without consuming it.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Consume a pending signal. Returns whether one was pending.
    pub fn reset(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}
