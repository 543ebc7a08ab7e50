//! Sync progress reporting.

/// Receives progress updates from a running sync.
pub trait SyncProgress: Send + Sync {
    /// A phase starts, e.g. "[2/13] Syncing GB.en".
    fn on_phase(&self, message: &str);

    /// A batch committed. `done` counts entries through this batch.
    fn on_batch(&self, batch: usize, total_batches: usize, done: usize, total: usize);

    /// The run finished.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl SyncProgress for SilentProgress {
    fn on_phase(&self, _message: &str) {}
    fn on_batch(&self, _batch: usize, _total_batches: usize, _done: usize, _total: usize) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl SyncProgress for LogProgress {
    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_batch(&self, batch: usize, total_batches: usize, done: usize, total: usize) {
        let pct = if total == 0 {
            100.0
        } else {
            done as f64 * 100.0 / total as f64
        };
        log::info!(
            "  Batch {}/{} ({:.1}%): {}/{} entries",
            batch,
            total_batches,
            pct,
            done,
            total
        );
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
