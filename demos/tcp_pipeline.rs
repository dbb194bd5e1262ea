//! TCP Pipeline Demo
//!
//! Runs the relay pipeline behind a real TCP gateway on a loopback port,
//! then connects an in-process client that streams frames and reads the
//! relayed results.
//!
//! Run with: cargo run --bin tcp_pipeline

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use collector::{Collector, CollectorConfig};
use contracts::{FrameLink, GatewaySettings, OverflowPolicy, RelayClock, Shutdown};
use distributor::{Distributor, DistributorConfig};
use fabric::Fabric;
use gateway::{GatewayListener, SessionRegistry, TcpFrameLink};
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

    info!("Starting TCP Pipeline Demo");

    let shutdown = Shutdown::new();
    let clock = Arc::new(RelayClock::new());
    let queue_timeout = Duration::from_millis(200);

    let fabric = Fabric::open(64)?;
    let ingress = Arc::new(RelaySlot::new(OverflowPolicy::DropNewest));
    let egress = Arc::new(RelaySlot::new(OverflowPolicy::OverwriteLatest));

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

    let distributor = Distributor::new(
        ingress.clone(),
        fabric.work_producer(),
        clock.clone(),
        shutdown.clone(),
        DistributorConfig {
            poll_timeout: queue_timeout,
        },
    );
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
    let collector_handle = collector.spawn();

    // Gateway on an ephemeral loopback port
    let settings = GatewaySettings {
        listen_addr: "127.0.0.1:0".to_string(),
        ..GatewaySettings::default()
    };
    let registry = Arc::new(SessionRegistry::new());
    let listener = GatewayListener::bind(
        settings,
        ingress,
        egress,
        clock,
        shutdown.clone(),
        registry,
        queue_timeout,
    )
    .await?;
    let addr = listener.local_addr()?.to_string();
    let gateway_metrics = listener.metrics();
    let listener_handle = listener.spawn();

    info!(%addr, "Gateway up, connecting client");

    // In-process client
    let mut client = TcpFrameLink::connect(&addr, 8 * 1024 * 1024).await?;

    let target_frames = 30u64;
    for seq in 0..target_frames {
        client.send(Bytes::copy_from_slice(&seq.to_be_bytes())).await?;
        tokio::time::sleep(Duration::from_millis(15)).await;
    }

    let mut received = 0u64;
    while let Ok(Ok(Some(payload))) =
        tokio::time::timeout(Duration::from_millis(300), client.recv()).await
    {
        let seq = u64::from_be_bytes(payload[..8].try_into()?);
        info!(seq, "frame relayed back");
        received += 1;
    }

    shutdown.trigger();
    listener_handle.await?;
    distributor_handle.await?;
    collector_handle.await?;
    pool.join().await;

    let snapshot = gateway_metrics.snapshot();
    info!(
        sent = target_frames,
        received,
        inbound = snapshot.inbound_frames,
        outbound = snapshot.outbound_frames,
        "Demo complete"
    );

    Ok(())
}
