//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::Shutdown;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut relay = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref listen) = args.listen {
        info!(listen = %listen, "Overriding listen address from CLI");
        relay.gateway.listen_addr = listen.clone();
    }
    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        relay.pipeline.worker_count = workers;
    }
    if let Some(max_delay_ms) = args.max_delay_ms {
        info!(max_delay_ms, "Overriding staleness budget from CLI");
        relay.pipeline.max_allowed_delay_ms = max_delay_ms;
    }

    info!(
        listen = %relay.gateway.listen_addr,
        workers = relay.pipeline.worker_count,
        max_delay_ms = relay.pipeline.max_allowed_delay_ms,
        transform = ?relay.transform.kind,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&relay);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        relay,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let pipeline = Pipeline::new(pipeline_config);
    let shutdown = Shutdown::new();

    // Signal handler flips the same flag every pipeline loop polls
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        warn!("Received shutdown signal, stopping pipeline...");
        signal_shutdown.trigger();
    });

    info!("Starting pipeline...");

    let stats = pipeline
        .run(shutdown)
        .await
        .context("Pipeline execution failed")?;

    info!(
        frames_ingested = stats.frames_ingested,
        frames_delivered = stats.frames_delivered,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Pipeline completed successfully"
    );

    stats.print_summary();

    info!("Frame Relay finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(relay: &contracts::RelayConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Gateway:");
    println!("  Listen: {}", relay.gateway.listen_addr);
    println!("  Max frame: {} bytes", relay.gateway.max_frame_len);
    println!("  Egress poll: {}ms", relay.gateway.egress_poll_ms);
    println!("  Stamp on receive: {}", relay.gateway.stamp_on_receive);
    println!("\nPipeline:");
    println!("  Workers: {}", relay.pipeline.worker_count);
    println!("  Staleness budget: {}ms", relay.pipeline.max_allowed_delay_ms);
    println!("  Queue timeout: {}ms", relay.pipeline.queue_timeout_ms);
    println!("  Fabric capacity: {}", relay.pipeline.fabric_capacity);
    println!("\nTransform:");
    println!("  Kind: {:?}", relay.transform.kind);
    println!("  JPEG quality: {}", relay.transform.jpeg_quality);
    println!();
}
