//! Gateway listener - accepts client connections and spawns sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use contracts::{Frame, GatewaySettings, InboundFrame, RelayClock, Shutdown};
use relay_queue::RelaySlot;

use crate::error::GatewayError;
use crate::metrics::GatewayMetrics;
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionConfig};
use crate::tcp::TcpFrameLink;

/// Accepts TCP clients and bridges each to the shared pipeline slots.
///
/// The pipeline serves one producer/consumer pair at a time: while a
/// session is active, further connections are refused and closed.
pub struct GatewayListener {
    listener: TcpListener,
    settings: GatewaySettings,
    ingress: Arc<RelaySlot<InboundFrame>>,
    egress: Arc<RelaySlot<Frame>>,
    clock: Arc<RelayClock>,
    shutdown: Shutdown,
    registry: Arc<SessionRegistry>,
    metrics: Arc<GatewayMetrics>,
    accept_timeout: Duration,
}

impl GatewayListener {
    /// Bind the listen address; failure here aborts pipeline startup
    #[allow(clippy::too_many_arguments)]
    pub async fn bind(
        settings: GatewaySettings,
        ingress: Arc<RelaySlot<InboundFrame>>,
        egress: Arc<RelaySlot<Frame>>,
        clock: Arc<RelayClock>,
        shutdown: Shutdown,
        registry: Arc<SessionRegistry>,
        accept_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let listener = TcpListener::bind(&settings.listen_addr)
            .await
            .map_err(|e| GatewayError::bind(&settings.listen_addr, e))?;

        info!(addr = %settings.listen_addr, "gateway listening");

        Ok(Self {
            listener,
            settings,
            ingress,
            egress,
            clock,
            shutdown,
            registry,
            metrics: Arc::new(GatewayMetrics::new()),
            accept_timeout,
        })
    }

    /// The bound local address (useful when binding port 0)
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        self.metrics.clone()
    }

    /// Accept loop; exits when shutdown is triggered
    pub async fn run(self) {
        loop {
            if self.shutdown.is_triggered() {
                break;
            }

            let accepted =
                match tokio::time::timeout(self.accept_timeout, self.listener.accept()).await {
                    Ok(Ok(accepted)) => accepted,
                    Ok(Err(e)) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                    Err(_) => continue,
                };

            let (stream, peer_addr) = accepted;

            if self.registry.active_count() > 0 {
                // Single-producer pipeline: one session at a time
                self.metrics.record_session_refused();
                warn!(%peer_addr, "session already active, refusing connection");
                drop(stream);
                continue;
            }

            self.metrics.record_session_opened();
            info!(%peer_addr, "client connected");

            let session_id = self.registry.next_id();
            let local_shutdown = Shutdown::new();
            self.registry.register(session_id, local_shutdown.clone());

            let link = TcpFrameLink::new(stream, self.settings.max_frame_len);
            let session = Session::new(
                session_id,
                link,
                self.ingress.clone(),
                self.egress.clone(),
                self.clock.clone(),
                self.shutdown.clone(),
                local_shutdown,
                SessionConfig {
                    egress_poll: self.settings.egress_poll(),
                    stamp_on_receive: self.settings.stamp_on_receive,
                },
                self.metrics.clone(),
            );

            let registry = self.registry.clone();
            tokio::spawn(async move {
                session.run().await;
                registry.deregister(session_id);
            });
        }

        // Stop any session that outlived the accept loop
        self.registry.close_all();
        info!("gateway listener stopped");
    }

    /// Spawn the accept loop as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
