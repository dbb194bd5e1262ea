//! Collector metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the collector loop
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    /// Results forwarded to the egress queue
    delivered: AtomicU64,
    /// Results rejected by the watermark
    out_of_order_drops: AtomicU64,
    /// Queued results replaced by a fresher one before delivery
    superseded_in_queue: AtomicU64,
}

impl CollectorMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result forwarded to egress
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watermark rejection
    pub fn record_out_of_order(&self) {
        self.out_of_order_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an egress replacement
    pub fn record_superseded(&self) {
        self.superseded_in_queue.fetch_add(1, Ordering::Relaxed);
    }

    /// Results delivered so far
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Watermark rejections so far
    pub fn out_of_order_drops(&self) -> u64 {
        self.out_of_order_drops.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> CollectorSnapshot {
        CollectorSnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            out_of_order_drops: self.out_of_order_drops.load(Ordering::Relaxed),
            superseded_in_queue: self.superseded_in_queue.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of collector metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectorSnapshot {
    pub delivered: u64,
    pub out_of_order_drops: u64,
    pub superseded_in_queue: u64,
}
