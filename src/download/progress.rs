//! Completion progress observers for download batches.

use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::ProgressBar;

/// Receives one tick per finished download task, successful or not.
///
/// Progress is cosmetic: observers must not fail and cannot influence the
/// batch.
pub trait ProgressObserver: Send + Sync {
    /// Called once each time a task finishes.
    fn advance(&self);
}

impl ProgressObserver for ProgressBar {
    fn advance(&self) {
        self.inc(1);
    }
}

/// Observer backed by an atomic counter, handy for headless callers.
#[derive(Debug, Default)]
pub struct CountingProgress {
    finished: AtomicUsize,
}

impl CountingProgress {
    /// Number of ticks received so far.
    #[must_use]
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

impl ProgressObserver for CountingProgress {
    fn advance(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}
