//! Worker pool metrics, shared by every worker in the pool

use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate metrics across the worker pool
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Frames transformed and published
    processed: AtomicU64,
    /// Frames discarded for exceeding the staleness budget
    stale_drops: AtomicU64,
    /// Frames discarded because the transform failed
    transform_failures: AtomicU64,
    /// Results dropped because the results channel was full
    fabric_rejections: AtomicU64,
}

impl WorkerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully processed frame
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a staleness drop
    pub fn record_stale_drop(&self) {
        self.stale_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transform failure
    pub fn record_transform_failure(&self) {
        self.transform_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a result refused by a full results channel
    pub fn record_fabric_rejection(&self) {
        self.fabric_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames processed so far
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Staleness drops so far
    pub fn stale_drops(&self) -> u64 {
        self.stale_drops.load(Ordering::Relaxed)
    }

    /// Transform failures so far
    pub fn transform_failures(&self) -> u64 {
        self.transform_failures.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            stale_drops: self.stale_drops.load(Ordering::Relaxed),
            transform_failures: self.transform_failures.load(Ordering::Relaxed),
            fabric_rejections: self.fabric_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of worker metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerSnapshot {
    pub processed: u64,
    pub stale_drops: u64,
    pub transform_failures: u64,
    pub fabric_rejections: u64,
}
