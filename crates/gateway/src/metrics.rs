//! Gateway metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics shared by the listener and every session
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    /// Inbound client messages received
    inbound_frames: AtomicU64,
    /// Outbound result messages sent
    outbound_frames: AtomicU64,
    /// Inbound frames refused by a full ingress slot
    ingress_rejections: AtomicU64,
    /// Sessions accepted
    sessions_opened: AtomicU64,
    /// Connections refused because a session was already active
    sessions_refused: AtomicU64,
}

impl GatewayMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inbound client message
    pub fn record_inbound(&self) {
        self.inbound_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an outbound result message
    pub fn record_outbound(&self) {
        self.outbound_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame refused by the ingress slot
    pub fn record_ingress_rejection(&self) {
        self.ingress_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted session
    pub fn record_session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a refused connection
    pub fn record_session_refused(&self) {
        self.sessions_refused.fetch_add(1, Ordering::Relaxed);
    }

    /// Inbound messages so far
    pub fn inbound_frames(&self) -> u64 {
        self.inbound_frames.load(Ordering::Relaxed)
    }

    /// Outbound messages so far
    pub fn outbound_frames(&self) -> u64 {
        self.outbound_frames.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> GatewaySnapshot {
        GatewaySnapshot {
            inbound_frames: self.inbound_frames.load(Ordering::Relaxed),
            outbound_frames: self.outbound_frames.load(Ordering::Relaxed),
            ingress_rejections: self.ingress_rejections.load(Ordering::Relaxed),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            sessions_refused: self.sessions_refused.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of gateway metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewaySnapshot {
    pub inbound_frames: u64,
    pub outbound_frames: u64,
    pub ingress_rejections: u64,
    pub sessions_opened: u64,
    pub sessions_refused: u64,
}
