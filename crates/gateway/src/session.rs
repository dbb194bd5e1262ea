//! Session - one client connection bridged to the pipeline slots.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use contracts::{Frame, FrameLink, InboundFrame, RelayClock, Shutdown};
use relay_queue::{PutOutcome, RelaySlot};

use crate::metrics::GatewayMetrics;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Egress drain timer period
    pub egress_poll: Duration,

    /// Stamp `captured_at` on receive instead of leaving it to the distributor
    pub stamp_on_receive: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            egress_poll: Duration::from_millis(20),
            stamp_on_receive: false,
        }
    }
}

/// One client connection.
///
/// Bridges link reads to ingress-slot puts (drop-newest: a fresh
/// unconsumed client frame beats a stale queued one) and drains the egress
/// slot to the link, opportunistically on every inbound message and on its
/// own timer.
pub struct Session<L: FrameLink> {
    session_id: u64,
    link: L,
    ingress: Arc<RelaySlot<InboundFrame>>,
    egress: Arc<RelaySlot<Frame>>,
    clock: Arc<RelayClock>,
    shutdown: Shutdown,
    local_shutdown: Shutdown,
    config: SessionConfig,
    metrics: Arc<GatewayMetrics>,
}

impl<L: FrameLink + 'static> Session<L> {
    /// Create a session over an established link
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: u64,
        link: L,
        ingress: Arc<RelaySlot<InboundFrame>>,
        egress: Arc<RelaySlot<Frame>>,
        clock: Arc<RelayClock>,
        shutdown: Shutdown,
        local_shutdown: Shutdown,
        config: SessionConfig,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            session_id,
            link,
            ingress,
            egress,
            clock,
            shutdown,
            local_shutdown,
            config,
            metrics,
        }
    }

    /// Run the session until the connection closes or shutdown is requested.
    ///
    /// On exit both slots are cleared: a dead session must not leave a
    /// stale frame for the next one.
    pub async fn run(self) {
        let Session {
            session_id,
            mut link,
            ingress,
            egress,
            clock,
            shutdown,
            local_shutdown,
            config,
            metrics,
        } = self;

        info!(session_id, "session started");
        let mut inbound_count: u64 = 0;

        loop {
            if shutdown.is_triggered() || local_shutdown.is_triggered() {
                break;
            }

            tokio::select! {
                // FrameLink::recv is cancel-safe by contract, so losing the
                // race against the timer cannot drop bytes
                inbound = link.recv() => {
                    match inbound {
                        Ok(Some(payload)) => {
                            metrics.record_inbound();
                            inbound_count += 1;
                            if inbound_count.is_multiple_of(120) {
                                debug!(
                                    session_id,
                                    frames = inbound_count,
                                    bytes = payload.len(),
                                    "session progress"
                                );
                            }

                            let frame = if config.stamp_on_receive {
                                InboundFrame::stamped(payload, clock.now())
                            } else {
                                InboundFrame::unstamped(payload)
                            };
                            if ingress.put(frame) == PutOutcome::Rejected {
                                metrics.record_ingress_rejection();
                            }

                            if drain_egress(&mut link, &egress, &metrics).await.is_err() {
                                warn!(session_id, "send failed, closing session");
                                break;
                            }
                        }
                        Ok(None) => {
                            info!(session_id, "client closed connection");
                            break;
                        }
                        Err(e) => {
                            warn!(session_id, error = %e, "link error, closing session");
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep(config.egress_poll) => {
                    if drain_egress(&mut link, &egress, &metrics).await.is_err() {
                        warn!(session_id, "send failed, closing session");
                        break;
                    }
                }
            }
        }

        // Per-session queue cleanup; the shared pipeline keeps running
        ingress.clear();
        egress.clear();

        info!(
            session_id,
            inbound = inbound_count,
            "session stopped"
        );
    }

    /// Spawn the session as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}

/// Send every queued result to the client
async fn drain_egress<L: FrameLink>(
    link: &mut L,
    egress: &RelaySlot<Frame>,
    metrics: &GatewayMetrics,
) -> Result<(), contracts::RelayError> {
    while let Some(frame) = egress.try_get() {
        link.send(frame.payload).await?;
        metrics.record_outbound();
    }
    Ok(())
}
