//! Lightweight progress reporting used by long-running phases
//!
//! Core pipeline logic reports through this trait instead of owning any
//! presentation concern; the CLI installs a tracing-backed sink and tests
//! install a no-op one.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Progress sink for long-running operations
///
/// Implementations must be shareable across worker tasks, so all methods take
/// `&self`.
pub trait Progress: Send + Sync {
    /// Called at the start of a phase with the total number of items (if known).
    fn begin(&self, _phase: &str, _total: usize) {}

    /// Called when one logical unit completes (one page fetched, one record written).
    fn item_done(&self) {}

    /// Free-form status line for human eyes.
    fn log(&self, _msg: &str) {}

    /// Called at the end of a phase, successful or not.
    fn finish(&self) {}
}

/// A no-op progress sink.
pub struct NullProgress;

impl Progress for NullProgress {}

/// Progress sink that reports through `tracing` at a fixed item interval.
pub struct TracingProgress {
    every: usize,
    done: AtomicUsize,
    total: AtomicUsize,
}

impl TracingProgress {
    /// Creates a sink that logs every `every` completed items.
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            done: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        }
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Progress for TracingProgress {
    fn begin(&self, phase: &str, total: usize) {
        self.done.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        tracing::info!("{}: {} items", phase, total);
    }

    fn item_done(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.every == 0 {
            tracing::info!("Progress: {}/{}", done, self.total.load(Ordering::Relaxed));
        }
    }

    fn log(&self, msg: &str) {
        tracing::info!("{}", msg);
    }

    fn finish(&self) {
        tracing::info!(
            "Done: {}/{}",
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed)
        );
    }
}
