//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    listen_addr: String,
    worker_count: usize,
    max_allowed_delay_ms: u64,
    transform: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    listen_addr: config.gateway.listen_addr.clone(),
                    worker_count: config.pipeline.worker_count,
                    max_allowed_delay_ms: config.pipeline.max_allowed_delay_ms,
                    transform: format!("{:?}", config.transform.kind),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.pipeline.worker_count == 1 {
        warnings.push(
            "Only one worker configured - a slow frame will stall the whole stream".to_string(),
        );
    }

    if config.pipeline.fabric_capacity < config.pipeline.worker_count {
        warnings.push(format!(
            "Fabric capacity ({}) is below the worker count ({}) - workers may starve",
            config.pipeline.fabric_capacity, config.pipeline.worker_count
        ));
    }

    if config.pipeline.max_allowed_delay_ms > 5_000 {
        warnings.push(format!(
            "Staleness budget of {}ms is unusually large for a real-time stream",
            config.pipeline.max_allowed_delay_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Listen: {}", summary.listen_addr);
            println!("  Workers: {}", summary.worker_count);
            println!("  Staleness budget: {}ms", summary.max_allowed_delay_ms);
            println!("  Transform: {}", summary.transform);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
