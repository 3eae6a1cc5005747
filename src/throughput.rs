//! Per-second throughput counter

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts successful dispatches since the last report.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ThroughputCounter {
    count: Arc<AtomicU64>,
}

impl ThroughputCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful dispatch
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Read and reset in one atomic step.
    ///
    /// An increment racing with `take` lands in exactly one window: either the
    /// value returned here or the next one.
    pub fn take(&self) -> u64 {
        self.count.swap(0, Ordering::SeqCst)
    }

    /// Value accumulated since the last `take`
    pub fn current(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
