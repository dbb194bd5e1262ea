//! # Integration Tests
//!
//! Cross-crate and end-to-end tests for the relay pipeline.
//!
//! Covers:
//! - Full loopback relay (client -> pipeline -> client)
//! - Ordering, staleness, and duplicate-timestamp properties
//! - Shutdown responsiveness across every loop

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_defaults_are_runnable() {
        let config = contracts::RelayConfig::default();
        assert!(config.pipeline.worker_count >= 1);
        assert!(config.pipeline.max_allowed_delay_ms >= 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use contracts::{
        Frame, FrameTransform, InboundFrame, OverflowPolicy, RelayClock, RelayError, Shutdown,
        Timestamp,
    };
    use collector::{Collector, CollectorConfig, CollectorMetrics};
    use distributor::{Distributor, DistributorConfig};
    use fabric::Fabric;
    use gateway::{loopback_pair, GatewayMetrics, LoopbackPeer, Session, SessionConfig};
    use relay_queue::RelaySlot;
    use worker_pool::transforms::PassthroughTransform;
    use worker_pool::{WorkerMetrics, WorkerPool, WorkerPoolConfig};

    const QUEUE_TIMEOUT: Duration = Duration::from_millis(50);

    /// A fully wired pipeline behind a loopback client link
    struct TestPipeline {
        shutdown: Shutdown,
        peer: LoopbackPeer,
        pool: WorkerPool,
        distributor_handle: tokio::task::JoinHandle<()>,
        collector_handle: tokio::task::JoinHandle<()>,
        session_handle: tokio::task::JoinHandle<()>,
        worker_metrics: Arc<WorkerMetrics>,
        collector_metrics: Arc<CollectorMetrics>,
    }

    impl TestPipeline {
        fn start(worker_count: usize, max_allowed_delay: Duration) -> Self {
            let shutdown = Shutdown::new();
            let clock = Arc::new(RelayClock::new());
            let fabric = Fabric::open(64).unwrap();
            let ingress = Arc::new(RelaySlot::new(OverflowPolicy::DropNewest));
            let egress = Arc::new(RelaySlot::new(OverflowPolicy::OverwriteLatest));

            let pool = WorkerPool::spawn(
                WorkerPoolConfig {
                    worker_count,
                    max_allowed_delay,
                    poll_timeout: QUEUE_TIMEOUT,
                },
                &fabric,
                clock.clone(),
                shutdown.clone(),
                |_| PassthroughTransform,
            );
            let worker_metrics = pool.metrics();

            let distributor = Distributor::new(
                ingress.clone(),
                fabric.work_producer(),
                clock.clone(),
                shutdown.clone(),
                DistributorConfig {
                    poll_timeout: QUEUE_TIMEOUT,
                },
            );
            let distributor_handle = distributor.spawn();

            let collector = Collector::new(
                fabric.result_consumer(),
                egress.clone(),
                clock.clone(),
                shutdown.clone(),
                CollectorConfig {
                    poll_timeout: QUEUE_TIMEOUT,
                },
            );
            let collector_metrics = collector.metrics();
            let collector_handle = collector.spawn();

            let (link, peer) = loopback_pair(64);
            let session = Session::new(
                0,
                link,
                ingress,
                egress,
                clock,
                shutdown.clone(),
                Shutdown::new(),
                SessionConfig {
                    egress_poll: Duration::from_millis(5),
                    stamp_on_receive: false,
                },
                Arc::new(GatewayMetrics::new()),
            );
            let session_handle = session.spawn();

            Self {
                shutdown,
                peer,
                pool,
                distributor_handle,
                collector_handle,
                session_handle,
                worker_metrics,
                collector_metrics,
            }
        }

        async fn stop(self) -> LoopbackPeer {
            self.shutdown.trigger();
            self.distributor_handle.await.unwrap();
            self.collector_handle.await.unwrap();
            self.session_handle.await.unwrap();
            self.pool.join().await;
            self.peer
        }
    }

    fn seq_payload(seq: u64) -> Bytes {
        Bytes::copy_from_slice(&seq.to_be_bytes())
    }

    fn payload_seq(payload: &Bytes) -> u64 {
        u64::from_be_bytes(payload[..8].try_into().unwrap())
    }

    /// Frames relayed through the full pipeline come back in submission
    /// order, with no duplicates and no regressions.
    #[tokio::test]
    async fn test_e2e_loopback_relay_is_monotonic() {
        let mut pipeline = TestPipeline::start(4, Duration::from_secs(5));

        for seq in 0..20u64 {
            pipeline.peer.send(seq_payload(seq)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // Collect until the stream goes quiet
        let mut seqs = Vec::new();
        while let Ok(Some(payload)) =
            tokio::time::timeout(Duration::from_millis(300), pipeline.peer.recv()).await
        {
            seqs.push(payload_seq(&payload));
        }

        assert!(!seqs.is_empty(), "no frames were relayed");
        for pair in seqs.windows(2) {
            assert!(pair[0] < pair[1], "delivery regressed: {:?}", seqs);
        }
        assert!(seqs.iter().all(|s| *s < 20));
        assert_eq!(pipeline.worker_metrics.snapshot().transform_failures, 0);
        assert!(pipeline.collector_metrics.delivered() >= seqs.len() as u64);

        pipeline.stop().await;
    }

    /// Random payloads survive the relay byte-for-byte.
    #[tokio::test]
    async fn test_e2e_payload_integrity() {
        use rand::RngCore;

        let mut pipeline = TestPipeline::start(2, Duration::from_secs(5));

        let mut payload = vec![0u8; 4096];
        rand::rng().fill_bytes(&mut payload);
        let payload = Bytes::from(payload);

        pipeline.peer.send(payload.clone()).await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), pipeline.peer.recv())
            .await
            .expect("relay timed out")
            .expect("link closed");
        assert_eq!(received, payload);

        pipeline.stop().await;
    }

    /// Workers finishing out of submission order: the client only ever
    /// sees the freshest result.
    #[tokio::test]
    async fn test_e2e_reorder_scenario() {
        // Per-payload artificial processing delay: frame 2 finishes first,
        // then 0, then 1
        struct SkewedTransform;

        impl FrameTransform for SkewedTransform {
            fn name(&self) -> &str {
                "skewed"
            }

            async fn apply(&mut self, payload: Bytes) -> Result<Bytes, RelayError> {
                let delay_ms = match payload[0] {
                    0 => 60,
                    1 => 90,
                    _ => 5,
                };
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(payload)
            }
        }

        let shutdown = Shutdown::new();
        let clock = Arc::new(RelayClock::new());
        let fabric = Fabric::open(8).unwrap();
        let egress = Arc::new(RelaySlot::new(OverflowPolicy::OverwriteLatest));

        let pool = WorkerPool::spawn(
            WorkerPoolConfig {
                worker_count: 3,
                max_allowed_delay: Duration::from_secs(5),
                poll_timeout: QUEUE_TIMEOUT,
            },
            &fabric,
            clock.clone(),
            shutdown.clone(),
            |_| SkewedTransform,
        );

        let collector = Collector::new(
            fabric.result_consumer(),
            egress.clone(),
            clock,
            shutdown.clone(),
            CollectorConfig {
                poll_timeout: QUEUE_TIMEOUT,
            },
        );
        let collector_metrics = collector.metrics();
        let collector_handle = collector.spawn();

        // Capture order 0, 1, 2 (captured_at = 0ms, 1ms, 2ms)
        let producer = fabric.work_producer();
        for seq in 0..3u64 {
            producer.publish(Frame::new(
                Timestamp::from_millis(seq),
                Bytes::from(vec![seq as u8]),
            ));
        }

        // Give all three workers time to finish
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Frame 2 won the race; 0 and 1 came back later and were dropped
        let delivered = egress.try_get().expect("expected one delivered frame");
        assert_eq!(delivered.captured_at, Timestamp::from_millis(2));
        assert!(egress.is_empty());

        let snapshot = collector_metrics.snapshot();
        assert_eq!(snapshot.delivered, 1);
        assert_eq!(snapshot.out_of_order_drops, 2);

        shutdown.trigger();
        collector_handle.await.unwrap();
        pool.join().await;
    }

    /// A frame older than the staleness budget at pickup never produces a
    /// result; the egress queue keeps its previous content.
    #[tokio::test]
    async fn test_e2e_staleness_scenario() {
        let shutdown = Shutdown::new();
        let clock = Arc::new(RelayClock::new());
        let fabric = Fabric::open(8).unwrap();
        let egress = Arc::new(RelaySlot::new(OverflowPolicy::OverwriteLatest));

        let pool = WorkerPool::spawn(
            WorkerPoolConfig {
                worker_count: 1,
                max_allowed_delay: Duration::from_millis(100),
                poll_timeout: QUEUE_TIMEOUT,
            },
            &fabric,
            clock.clone(),
            shutdown.clone(),
            |_| PassthroughTransform,
        );
        let worker_metrics = pool.metrics();

        let collector = Collector::new(
            fabric.result_consumer(),
            egress.clone(),
            clock.clone(),
            shutdown.clone(),
            CollectorConfig {
                poll_timeout: QUEUE_TIMEOUT,
            },
        );
        let collector_handle = collector.spawn();

        // Previous content of the egress queue
        let resident = Frame::new(Timestamp::from_micros(1), Bytes::from_static(b"previous"));
        egress.put(resident);

        // A frame already 150ms old when the worker examines it
        let now = clock.now().as_micros();
        let aged = Timestamp::from_micros(now.saturating_sub(150_000));
        fabric
            .work_producer()
            .publish(Frame::new(aged, Bytes::from_static(b"stale")));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(worker_metrics.stale_drops(), 1);
        assert_eq!(worker_metrics.processed(), 0);
        let still_there = egress.try_get().expect("egress content must survive");
        assert_eq!(still_there.payload, Bytes::from_static(b"previous"));

        shutdown.trigger();
        collector_handle.await.unwrap();
        pool.join().await;
    }

    /// Two results with the same capture timestamp: exactly the first one
    /// observed reaches the egress queue.
    #[tokio::test]
    async fn test_e2e_duplicate_timestamp() {
        // The session path stamps distinct timestamps, so the duplicate
        // case is driven at the collector seam.
        let shutdown = Shutdown::new();
        let clock = Arc::new(RelayClock::new());
        let fabric = Fabric::open(8).unwrap();
        let egress = Arc::new(RelaySlot::new(OverflowPolicy::OverwriteLatest));

        let collector = Collector::new(
            fabric.result_consumer(),
            egress.clone(),
            clock,
            shutdown.clone(),
            CollectorConfig {
                poll_timeout: QUEUE_TIMEOUT,
            },
        );
        let collector_metrics = collector.metrics();
        let collector_handle = collector.spawn();

        let producer = fabric.result_producer();
        producer.publish(Frame::new(
            Timestamp::from_millis(7),
            Bytes::from_static(b"first"),
        ));
        producer.publish(Frame::new(
            Timestamp::from_millis(7),
            Bytes::from_static(b"second"),
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;

        let delivered = egress.try_get().expect("expected one delivered frame");
        assert_eq!(delivered.payload, Bytes::from_static(b"first"));
        assert!(egress.is_empty());
        assert_eq!(collector_metrics.snapshot().delivered, 1);
        assert_eq!(collector_metrics.snapshot().out_of_order_drops, 1);

        shutdown.trigger();
        collector_handle.await.unwrap();
    }

    /// Asserting the shutdown flag stops every loop within twice the
    /// queue timeout.
    #[tokio::test]
    async fn test_e2e_shutdown_no_deadlock() {
        let pipeline = TestPipeline::start(4, Duration::from_secs(1));

        // Let the loops settle into their blocking reads
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(QUEUE_TIMEOUT * 2, pipeline.stop())
            .await
            .expect("a pipeline loop failed to observe shutdown in time");
    }

    /// Ingress uses drop-newest: while a frame is waiting for the
    /// distributor, a burst keeps the first frame, not the last.
    #[tokio::test]
    async fn test_ingress_drop_newest_under_burst() {
        let ingress: RelaySlot<InboundFrame> = RelaySlot::new(OverflowPolicy::DropNewest);

        for seq in 0..5u64 {
            ingress.put(InboundFrame::unstamped(seq_payload(seq)));
        }

        let survivor = ingress.try_get().unwrap();
        assert_eq!(payload_seq(&survivor.payload), 0);
        assert!(ingress.is_empty());
    }
}
