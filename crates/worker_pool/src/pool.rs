//! WorkerPool - spawns and joins the pool of worker tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use contracts::{FrameTransform, RelayClock, Shutdown};
use fabric::Fabric;

use crate::metrics::WorkerMetrics;
use crate::worker::run_worker;

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of workers (the only parallelism tunable)
    pub worker_count: usize,

    /// Staleness budget: frames older than this on pickup are discarded
    pub max_allowed_delay: Duration,

    /// Work channel read timeout; bounds shutdown observation
    pub poll_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            max_allowed_delay: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(1),
        }
    }
}

/// Handle to the running worker pool
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    metrics: Arc<WorkerMetrics>,
}

impl WorkerPool {
    /// Spawn `config.worker_count` workers over the fabric.
    ///
    /// `factory` builds one transform instance per worker, so workers share
    /// no transform state.
    pub fn spawn<T, F>(
        config: WorkerPoolConfig,
        fabric: &Fabric,
        clock: Arc<RelayClock>,
        shutdown: Shutdown,
        factory: F,
    ) -> Self
    where
        T: FrameTransform + 'static,
        F: Fn(usize) -> T,
    {
        let metrics = Arc::new(WorkerMetrics::new());
        let mut handles = Vec::with_capacity(config.worker_count);

        for worker_id in 0..config.worker_count {
            handles.push(tokio::spawn(run_worker(
                worker_id,
                factory(worker_id),
                fabric.work_consumer(),
                fabric.result_producer(),
                clock.clone(),
                config.clone(),
                shutdown.clone(),
                metrics.clone(),
            )));
        }

        info!(workers = handles.len(), "worker pool started");

        Self { handles, metrics }
    }

    /// Number of workers in the pool
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        self.metrics.clone()
    }

    /// Await every worker; call after triggering shutdown
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "worker task panicked");
            }
        }
        info!("worker pool stopped");
    }
}
