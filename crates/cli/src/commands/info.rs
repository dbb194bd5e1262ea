//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for display
#[derive(Serialize)]
struct ConfigInfo {
    config_path: String,
    gateway: GatewayInfo,
    pipeline: PipelineInfo,
    transform: TransformInfo,
}

#[derive(Serialize)]
struct GatewayInfo {
    listen_addr: String,
    max_frame_len: usize,
    egress_poll_ms: u64,
    stamp_on_receive: bool,
}

#[derive(Serialize)]
struct PipelineInfo {
    worker_count: usize,
    max_allowed_delay_ms: u64,
    queue_timeout_ms: u64,
    fabric_capacity: usize,
}

#[derive(Serialize)]
struct TransformInfo {
    kind: String,
    jpeg_quality: u8,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = ConfigInfo {
        config_path: args.config.display().to_string(),
        gateway: GatewayInfo {
            listen_addr: config.gateway.listen_addr.clone(),
            max_frame_len: config.gateway.max_frame_len,
            egress_poll_ms: config.gateway.egress_poll_ms,
            stamp_on_receive: config.gateway.stamp_on_receive,
        },
        pipeline: PipelineInfo {
            worker_count: config.pipeline.worker_count,
            max_allowed_delay_ms: config.pipeline.max_allowed_delay_ms,
            queue_timeout_ms: config.pipeline.queue_timeout_ms,
            fabric_capacity: config.pipeline.fabric_capacity,
        },
        transform: TransformInfo {
            kind: format!("{:?}", config.transform.kind),
            jpeg_quality: config.transform.jpeg_quality,
        },
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_info(&info);
    }

    Ok(())
}

fn print_info(info: &ConfigInfo) {
    println!("\n=== Frame Relay Configuration ===\n");
    println!("Config: {}", info.config_path);
    println!("\nGateway:");
    println!("  Listen: {}", info.gateway.listen_addr);
    println!("  Max frame: {} bytes", info.gateway.max_frame_len);
    println!("  Egress poll: {}ms", info.gateway.egress_poll_ms);
    println!("  Stamp on receive: {}", info.gateway.stamp_on_receive);
    println!("\nPipeline:");
    println!("  Workers: {}", info.pipeline.worker_count);
    println!("  Staleness budget: {}ms", info.pipeline.max_allowed_delay_ms);
    println!("  Queue timeout: {}ms", info.pipeline.queue_timeout_ms);
    println!("  Fabric capacity: {}", info.pipeline.fabric_capacity);
    println!("\nTransform:");
    println!("  Kind: {}", info.transform.kind);
    println!("  JPEG quality: {}", info.transform.jpeg_quality);
    println!();
}
