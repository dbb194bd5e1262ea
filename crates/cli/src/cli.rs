//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Frame Relay - real-time frame relay pipeline over a worker pool
#[derive(Parser, Debug)]
#[command(
    name = "frame-relay",
    author,
    version,
    about = "Real-time frame relay pipeline",
    long_about = "Relays a live stream of binary frames from a client through a pool of\n\
                  stateless workers and back, under a real-time latency budget. Stale\n\
                  frames are dropped rather than queued; out-of-order results never\n\
                  overwrite a fresher one."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FRAME_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FRAME_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "FRAME_RELAY_CONFIG")]
    pub config: PathBuf,

    /// Override the gateway listen address from configuration
    #[arg(long, env = "FRAME_RELAY_LISTEN")]
    pub listen: Option<String>,

    /// Override the worker pool size from configuration
    #[arg(long, env = "FRAME_RELAY_WORKERS")]
    pub workers: Option<usize>,

    /// Override the staleness budget in milliseconds
    #[arg(long, env = "FRAME_RELAY_MAX_DELAY_MS")]
    pub max_delay_ms: Option<u64>,

    /// Pipeline timeout in seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "FRAME_RELAY_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "FRAME_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
