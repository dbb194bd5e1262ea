//! Collector - main loop for fan-in ordering and egress publication

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use contracts::{Frame, RelayClock, Shutdown};
use fabric::{RecvOutcome, ResultConsumer};
use relay_queue::{PutOutcome, RelaySlot};

use crate::metrics::CollectorMetrics;
use crate::watermark::Watermark;

/// Collector configuration
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Results read timeout; bounds shutdown observation
    pub poll_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
        }
    }
}

/// Pulls results from the fan-in channel and publishes only monotonically
/// advancing, freshest-known results to the egress slot.
///
/// Workers finish in arbitrary order (heterogeneous processing time); the
/// transport guarantees nothing. Ordering is reconstructed here, and only
/// here, by the watermark rule.
pub struct Collector {
    results: ResultConsumer,
    egress: Arc<RelaySlot<Frame>>,
    clock: Arc<RelayClock>,
    shutdown: Shutdown,
    config: CollectorConfig,
    watermark: Watermark,
    metrics: Arc<CollectorMetrics>,
}

impl Collector {
    /// Create a collector over the given results channel and egress slot.
    ///
    /// The egress slot must use the overwrite-latest policy: a newer
    /// accepted result always replaces whatever is still queued, since only
    /// the freshest unsent result is useful to the client.
    pub fn new(
        results: ResultConsumer,
        egress: Arc<RelaySlot<Frame>>,
        clock: Arc<RelayClock>,
        shutdown: Shutdown,
        config: CollectorConfig,
    ) -> Self {
        Self {
            results,
            egress,
            clock,
            shutdown,
            config,
            watermark: Watermark::new(),
            metrics: Arc::new(CollectorMetrics::new()),
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<CollectorMetrics> {
        self.metrics.clone()
    }

    /// Run the collector main loop until shutdown
    pub async fn run(mut self) {
        info!("Collector started");

        while !self.shutdown.is_triggered() {
            let frame = match self.results.recv(self.config.poll_timeout).await {
                RecvOutcome::Frame(frame) => frame,
                RecvOutcome::TimedOut => continue,
                RecvOutcome::Disconnected => {
                    debug!("results channel disconnected, stopping collector");
                    break;
                }
            };

            if !self.watermark.observe(frame.captured_at) {
                // Superseded arrival: a fresher result already went out;
                // forwarding this one would regress what the client sees.
                self.metrics.record_out_of_order();
                observability::record_out_of_order_drop();
                trace!(captured_at = %frame.captured_at, "out-of-order result dropped");
                continue;
            }

            let captured_at = frame.captured_at;
            let latency_ms = self.clock.elapsed_since(captured_at).as_secs_f64() * 1_000.0;

            match self.egress.put(frame) {
                PutOutcome::Stored => {}
                PutOutcome::Replaced => {
                    self.metrics.record_superseded();
                    observability::record_superseded_in_queue();
                }
                PutOutcome::Rejected => {
                    // Egress is overwrite-latest; a rejection means the slot
                    // was misconfigured. Count it as superseded and move on.
                    self.metrics.record_superseded();
                }
            }

            self.metrics.record_delivered();
            observability::record_frame_delivered(latency_ms);
            observability::metrics::record_watermark(captured_at);
            trace!(captured_at = %captured_at, latency_ms, "result delivered to egress");
        }

        info!(
            delivered = self.metrics.delivered(),
            out_of_order = self.metrics.out_of_order_drops(),
            "Collector stopped"
        );
    }

    /// Spawn the collector as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
