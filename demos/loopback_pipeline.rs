//! Loopback Pipeline Demo
//!
//! Wires the whole relay pipeline behind an in-memory client link, pushes
//! a short burst of frames through it, and prints what comes back.
//!
//! Run with: cargo run --bin loopback_pipeline

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use collector::{Collector, CollectorConfig};
use contracts::{OverflowPolicy, RelayClock, Shutdown};
use distributor::{Distributor, DistributorConfig};
use fabric::Fabric;
use gateway::{loopback_pair, GatewayMetrics, Session, SessionConfig};
use relay_queue::RelaySlot;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use worker_pool::transforms::PassthroughTransform;
use worker_pool::{WorkerPool, WorkerPoolConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Loopback Pipeline Demo");

    let shutdown = Shutdown::new();
    let clock = Arc::new(RelayClock::new());
    let queue_timeout = Duration::from_millis(200);

    // ==== Stage 1: Fabric and hand-off slots ====
    let fabric = Fabric::open(64)?;
    let ingress = Arc::new(RelaySlot::new(OverflowPolicy::DropNewest));
    let egress = Arc::new(RelaySlot::new(OverflowPolicy::OverwriteLatest));

    // ==== Stage 2: Worker pool ====
    let pool = WorkerPool::spawn(
        WorkerPoolConfig {
            worker_count: 4,
            max_allowed_delay: Duration::from_secs(1),
            poll_timeout: queue_timeout,
        },
        &fabric,
        clock.clone(),
        shutdown.clone(),
        |_| PassthroughTransform,
    );

    // ==== Stage 3: Distributor and Collector ====
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

    // ==== Stage 4: Loopback client session ====
    let (link, mut peer) = loopback_pair(64);
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

    // ==== Stage 5: Drive frames through ====
    let target_frames = 30u64;
    info!(target_frames, "Sending frames");

    for seq in 0..target_frames {
        peer.send(Bytes::copy_from_slice(&seq.to_be_bytes())).await?;
        tokio::time::sleep(Duration::from_millis(15)).await;
    }

    let mut received = 0u64;
    while let Ok(Some(payload)) =
        tokio::time::timeout(Duration::from_millis(300), peer.recv()).await
    {
        let seq = u64::from_be_bytes(payload[..8].try_into()?);
        info!(seq, "frame relayed back");
        received += 1;
    }

    // ==== Stage 6: Shutdown ====
    shutdown.trigger();
    distributor_handle.await?;
    collector_handle.await?;
    session_handle.await?;
    pool.join().await;

    info!(
        sent = target_frames,
        received,
        ingested = distributor_metrics.ingested(),
        delivered = collector_metrics.delivered(),
        out_of_order = collector_metrics.out_of_order_drops(),
        "Demo complete"
    );

    Ok(())
}
