//! Worker loop: staleness admission, transform, result publication.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use contracts::{Frame, FrameTransform, RelayClock, Shutdown};
use fabric::{RecvOutcome, ResultProducer, SendOutcome, WorkConsumer};

use crate::metrics::WorkerMetrics;
use crate::pool::WorkerPoolConfig;

/// Run one worker until shutdown or fabric disconnect.
///
/// The worker is pure with respect to pipeline state: it holds no ordering
/// responsibility and shares nothing with its siblings except the fabric
/// endpoints and the metrics counters.
#[allow(clippy::too_many_arguments)]
pub async fn run_worker<T: FrameTransform>(
    worker_id: usize,
    mut transform: T,
    work: WorkConsumer,
    results: ResultProducer,
    clock: Arc<RelayClock>,
    config: WorkerPoolConfig,
    shutdown: Shutdown,
    metrics: Arc<WorkerMetrics>,
) {
    debug!(worker_id, transform = transform.name(), "worker started");

    while !shutdown.is_triggered() {
        let frame = match work.recv(config.poll_timeout).await {
            RecvOutcome::Frame(frame) => frame,
            RecvOutcome::TimedOut => continue,
            RecvOutcome::Disconnected => {
                debug!(worker_id, "work channel disconnected");
                break;
            }
        };

        // Staleness admission: work on a frame that can no longer reach the
        // client in time only wastes cycles and delays fresher frames.
        let delay = clock.elapsed_since(frame.captured_at);
        if delay > config.max_allowed_delay {
            metrics.record_stale_drop();
            let lateness_ms = delay.as_secs_f64() * 1_000.0;
            observability::record_stale_drop(lateness_ms);
            debug!(
                worker_id,
                lateness_ms = format!("{:.1}", lateness_ms),
                "dropping stale frame"
            );
            continue;
        }

        let captured_at = frame.captured_at;
        let result = match transform.apply(frame.payload).await {
            Ok(result) => result,
            Err(e) => {
                // A single bad frame must never take the worker down
                metrics.record_transform_failure();
                observability::record_transform_failure(transform.name());
                warn!(worker_id, error = %e, "transform failed, frame dropped");
                continue;
            }
        };

        match results.publish(Frame::new(captured_at, result)) {
            SendOutcome::Sent => metrics.record_processed(),
            SendOutcome::Full => {
                metrics.record_fabric_rejection();
                debug!(worker_id, "results channel full, result dropped");
            }
            SendOutcome::Disconnected => {
                debug!(worker_id, "results channel disconnected");
                break;
            }
        }
    }

    info!(
        worker_id,
        processed = metrics.processed(),
        "worker stopped"
    );
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use contracts::{RelayError, Timestamp};
    use fabric::Fabric;

    use super::*;
    use crate::transforms::PassthroughTransform;

    struct FailingTransform;

    impl FrameTransform for FailingTransform {
        fn name(&self) -> &str {
            "failing"
        }

        async fn apply(&mut self, _payload: Bytes) -> Result<Bytes, RelayError> {
            Err(RelayError::transform_failed("failing", "always fails"))
        }
    }

    fn config() -> WorkerPoolConfig {
        WorkerPoolConfig {
            worker_count: 1,
            max_allowed_delay: Duration::from_millis(50),
            poll_timeout: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_fresh_frame_is_processed() {
        let fabric = Fabric::open(4).unwrap();
        let clock = Arc::new(RelayClock::new());
        let shutdown = Shutdown::new();
        let metrics = Arc::new(WorkerMetrics::new());

        let handle = tokio::spawn(run_worker(
            0,
            PassthroughTransform,
            fabric.work_consumer(),
            fabric.result_producer(),
            clock.clone(),
            config(),
            shutdown.clone(),
            metrics.clone(),
        ));

        fabric
            .work_producer()
            .publish(Frame::new(clock.now(), Bytes::from_static(b"payload")));

        let result = fabric
            .result_consumer()
            .recv(Duration::from_secs(1))
            .await;
        assert!(matches!(result, RecvOutcome::Frame(_)));
        assert_eq!(metrics.processed(), 1);

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_frame_is_dropped() {
        let fabric = Fabric::open(4).unwrap();
        let clock = Arc::new(RelayClock::new());
        let shutdown = Shutdown::new();
        let metrics = Arc::new(WorkerMetrics::new());

        // Stamped at the epoch, examined well past the 50ms budget
        fabric
            .work_producer()
            .publish(Frame::new(Timestamp::from_micros(0), Bytes::from_static(b"old")));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let handle = tokio::spawn(run_worker(
            0,
            PassthroughTransform,
            fabric.work_consumer(),
            fabric.result_producer(),
            clock,
            config(),
            shutdown.clone(),
            metrics.clone(),
        ));

        // No result may appear
        let result = fabric
            .result_consumer()
            .recv(Duration::from_millis(200))
            .await;
        assert!(matches!(result, RecvOutcome::TimedOut));
        assert_eq!(metrics.stale_drops(), 1);
        assert_eq!(metrics.processed(), 0);

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_transform_failure_does_not_kill_worker() {
        let fabric = Fabric::open(4).unwrap();
        let clock = Arc::new(RelayClock::new());
        let shutdown = Shutdown::new();
        let metrics = Arc::new(WorkerMetrics::new());

        let handle = tokio::spawn(run_worker(
            0,
            FailingTransform,
            fabric.work_consumer(),
            fabric.result_producer(),
            clock.clone(),
            config(),
            shutdown.clone(),
            metrics.clone(),
        ));

        for _ in 0..3 {
            fabric
                .work_producer()
                .publish(Frame::new(clock.now(), Bytes::from_static(b"bad")));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(metrics.transform_failures(), 3);
        assert!(!handle.is_finished());

        shutdown.trigger();
        handle.await.unwrap();
    }
}
