//! Distributor - main loop for ingress drain and fan-out

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use contracts::{InboundFrame, RelayClock, Shutdown};
use fabric::{SendOutcome, WorkProducer};
use relay_queue::RelaySlot;

use crate::metrics::DistributorMetrics;

/// Distributor configuration
#[derive(Debug, Clone)]
pub struct DistributorConfig {
    /// Ingress read timeout; bounds shutdown observation
    pub poll_timeout: Duration,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
        }
    }
}

/// Pulls frames from the ingress slot, stamps capture time, and publishes
/// them onto the work channel.
///
/// The distributor never waits for a worker to accept: the fabric's own
/// buffering absorbs transient mismatches between arrival rate and worker
/// throughput, and a full channel drops the frame (the stream is lossy by
/// design).
pub struct Distributor {
    ingress: Arc<RelaySlot<InboundFrame>>,
    work: WorkProducer,
    clock: Arc<RelayClock>,
    shutdown: Shutdown,
    config: DistributorConfig,
    metrics: Arc<DistributorMetrics>,
}

impl Distributor {
    /// Create a distributor over the given ingress slot and work channel
    pub fn new(
        ingress: Arc<RelaySlot<InboundFrame>>,
        work: WorkProducer,
        clock: Arc<RelayClock>,
        shutdown: Shutdown,
        config: DistributorConfig,
    ) -> Self {
        Self {
            ingress,
            work,
            clock,
            shutdown,
            config,
            metrics: Arc::new(DistributorMetrics::new()),
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<DistributorMetrics> {
        self.metrics.clone()
    }

    /// Run the distributor main loop until shutdown.
    ///
    /// In-flight frames are not drained on exit; at most one frame's worth
    /// of work is lost.
    pub async fn run(self) {
        info!("Distributor started");

        while !self.shutdown.is_triggered() {
            let Some(inbound) = self.ingress.get(self.config.poll_timeout).await else {
                continue;
            };

            self.metrics.record_ingested();
            observability::record_frame_ingested();
            if inbound.captured_at.is_none() {
                self.metrics.record_stamped();
            }
            let frame = inbound.into_frame(self.clock.now());

            match self.work.publish(frame) {
                SendOutcome::Sent => {
                    let count = self.metrics.ingested();
                    trace!(frames = count, "frame published to work channel");
                    if count.is_multiple_of(100) {
                        debug!(frames = count, "Distributor progress");
                    }
                }
                SendOutcome::Full => {
                    self.metrics.record_fabric_rejection();
                    debug!("work channel full, frame dropped");
                }
                SendOutcome::Disconnected => {
                    warn!("work channel disconnected, stopping distributor");
                    break;
                }
            }
        }

        info!(
            ingested = self.metrics.ingested(),
            rejected = self.metrics.fabric_rejections(),
            "Distributor stopped"
        );
    }

    /// Spawn the distributor as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
