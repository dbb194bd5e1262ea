//! Distributor metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the distributor loop
#[derive(Debug, Default)]
pub struct DistributorMetrics {
    /// Frames accepted from the ingress slot
    ingested: AtomicU64,
    /// Frames stamped here (gateway left them unstamped)
    stamped: AtomicU64,
    /// Frames dropped because the work channel was full
    fabric_rejections: AtomicU64,
}

impl DistributorMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted ingress frame
    pub fn record_ingested(&self) {
        self.ingested.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame stamped by the distributor
    pub fn record_stamped(&self) {
        self.stamped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame refused by a full work channel
    pub fn record_fabric_rejection(&self) {
        self.fabric_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames accepted so far
    pub fn ingested(&self) -> u64 {
        self.ingested.load(Ordering::Relaxed)
    }

    /// Frames refused by the fabric so far
    pub fn fabric_rejections(&self) -> u64 {
        self.fabric_rejections.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> DistributorSnapshot {
        DistributorSnapshot {
            ingested: self.ingested.load(Ordering::Relaxed),
            stamped: self.stamped.load(Ordering::Relaxed),
            fabric_rejections: self.fabric_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of distributor metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributorSnapshot {
    pub ingested: u64,
    pub stamped: u64,
    pub fabric_rejections: u64,
}
