//! Pipeline orchestrator - coordinates all components.
//!
//! Startup order follows the process lifecycle contract: fabric first,
//! then the worker pool, distributor and collector, and only then the
//! client-facing gateway. Shutdown trips one flag and joins every loop
//! with a bounded wait.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use collector::{Collector, CollectorConfig};
use contracts::{OverflowPolicy, RelayClock, RelayConfig, Shutdown};
use distributor::{Distributor, DistributorConfig};
use fabric::Fabric;
use gateway::{GatewayListener, SessionRegistry};
use worker_pool::transforms::BuiltinTransform;
use worker_pool::{WorkerPool, WorkerPoolConfig};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The relay configuration
    pub relay: RelayConfig,

    /// Pipeline timeout (None = run until shutdown)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline until shutdown or timeout
    pub async fn run(self, shutdown: Shutdown) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let relay = &self.config.relay;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let clock = Arc::new(RelayClock::new());
        let queue_timeout = relay.pipeline.queue_timeout();

        // Fabric: failure here aborts startup, there is no degraded mode
        let fabric = Fabric::open(relay.pipeline.fabric_capacity)
            .context("Failed to open messaging fabric")?;

        // Hand-off slots: a fresh unconsumed client frame beats a stale
        // queued one (ingress); only the freshest unsent result is useful
        // (egress)
        let ingress = Arc::new(relay_queue::RelaySlot::new(OverflowPolicy::DropNewest));
        let egress = Arc::new(relay_queue::RelaySlot::new(OverflowPolicy::OverwriteLatest));

        // Worker pool
        let transform_settings = relay.transform.clone();
        let pool = WorkerPool::spawn(
            WorkerPoolConfig {
                worker_count: relay.pipeline.worker_count,
                max_allowed_delay: relay.pipeline.max_allowed_delay(),
                poll_timeout: queue_timeout,
            },
            &fabric,
            clock.clone(),
            shutdown.clone(),
            |_| BuiltinTransform::from_settings(&transform_settings),
        );
        let worker_metrics = pool.metrics();

        // Distributor
        let distributor = Distributor::new(
            ingress.clone(),
            fabric.work_producer(),
            clock.clone(),
            shutdown.clone(),
            DistributorConfig {
                poll_timeout: queue_timeout,
            },
        );
        let distributor_metrics = distributor.metrics();
        let distributor_handle = distributor.spawn();

        // Collector
        let collector = Collector::new(
            fabric.result_consumer(),
            egress.clone(),
            clock.clone(),
            shutdown.clone(),
            CollectorConfig {
                poll_timeout: queue_timeout,
            },
        );
        let collector_metrics = collector.metrics();
        let collector_handle = collector.spawn();

        // Gateway, last: no client is accepted before the pipeline is up
        let registry = Arc::new(SessionRegistry::new());
        let listener = GatewayListener::bind(
            relay.gateway.clone(),
            ingress.clone(),
            egress.clone(),
            clock.clone(),
            shutdown.clone(),
            registry.clone(),
            queue_timeout,
        )
        .await
        .context("Failed to start gateway listener")?;
        let gateway_metrics = listener.metrics();
        let listener_handle = listener.spawn();

        info!(
            workers = relay.pipeline.worker_count,
            listen = %relay.gateway.listen_addr,
            timeout = ?self.config.timeout,
            "Pipeline running"
        );

        // Wait for shutdown or timeout
        self.wait_for_stop(&shutdown).await;
        shutdown.trigger();
        registry.close_all();

        // Every loop observes the flag within one queue timeout; give each
        // twice that before declaring it stuck
        info!("Shutting down pipeline...");
        let join_budget = queue_timeout * 2;
        join_component("gateway", listener_handle, join_budget).await;
        join_component("distributor", distributor_handle, join_budget).await;
        join_component("collector", collector_handle, join_budget).await;
        if timeout(join_budget, pool.join()).await.is_err() {
            warn!("worker pool did not stop within budget");
        }

        drop(fabric);

        // Collect final statistics
        let distributor_snapshot = distributor_metrics.snapshot();
        let worker_snapshot = worker_metrics.snapshot();
        let collector_snapshot = collector_metrics.snapshot();
        let gateway_snapshot = gateway_metrics.snapshot();

        let stats = PipelineStats {
            frames_ingested: distributor_snapshot.ingested,
            frames_delivered: collector_snapshot.delivered,
            stale_drops: worker_snapshot.stale_drops,
            out_of_order_drops: collector_snapshot.out_of_order_drops,
            superseded_in_queue: collector_snapshot.superseded_in_queue,
            transform_failures: worker_snapshot.transform_failures,
            fabric_rejections: distributor_snapshot.fabric_rejections
                + worker_snapshot.fabric_rejections,
            ingress_rejections: gateway_snapshot.ingress_rejections,
            inbound_frames: gateway_snapshot.inbound_frames,
            outbound_frames: gateway_snapshot.outbound_frames,
            sessions_opened: gateway_snapshot.sessions_opened,
            sessions_refused: gateway_snapshot.sessions_refused,
            worker_count: relay.pipeline.worker_count,
            duration: start_time.elapsed(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Block until shutdown is requested or the configured timeout elapses
    async fn wait_for_stop(&self, shutdown: &Shutdown) {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        loop {
            if shutdown.is_triggered() {
                return;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    info!("Pipeline timeout reached");
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

/// Join one component task with a bounded wait
async fn join_component(name: &str, handle: JoinHandle<()>, budget: Duration) {
    match timeout(budget, handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(component = name, error = ?e, "component task panicked"),
        Err(_) => warn!(component = name, "component did not stop within budget"),
    }
}
