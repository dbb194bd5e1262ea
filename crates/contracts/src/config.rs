//! Relay configuration types.
//!
//! Deserialized from TOML/JSON by `config_loader`; every field has a
//! default so a partial file (or none at all) yields a runnable config.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level configuration for one pipeline instance
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RelayConfig {
    /// Gateway / client-connection settings
    #[serde(default)]
    #[validate(nested)]
    pub gateway: GatewaySettings,

    /// Core pipeline settings
    #[serde(default)]
    #[validate(nested)]
    pub pipeline: PipelineSettings,

    /// Transform selection and parameters
    #[serde(default)]
    #[validate(nested)]
    pub transform: TransformSettings,
}

/// Gateway settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GatewaySettings {
    /// Address the gateway listener binds
    #[serde(default = "default_listen_addr")]
    #[validate(length(min = 1))]
    pub listen_addr: String,

    /// Maximum inbound message size in bytes
    #[serde(default = "default_max_frame_len")]
    #[validate(range(min = 1))]
    pub max_frame_len: usize,

    /// Egress drain timer period (milliseconds)
    #[serde(default = "default_egress_poll_ms")]
    #[validate(range(min = 1, max = 1000))]
    pub egress_poll_ms: u64,

    /// Stamp `captured_at` at the gateway instead of the distributor
    #[serde(default)]
    pub stamp_on_receive: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_frame_len: default_max_frame_len(),
            egress_poll_ms: default_egress_poll_ms(),
            stamp_on_receive: false,
        }
    }
}

impl GatewaySettings {
    /// Egress drain period as a [`Duration`]
    pub fn egress_poll(&self) -> Duration {
        Duration::from_millis(self.egress_poll_ms)
    }
}

/// Core pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineSettings {
    /// Worker pool size (the only parallelism tunable)
    #[serde(default = "default_worker_count")]
    #[validate(range(min = 1, max = 256))]
    pub worker_count: usize,

    /// Staleness budget: a frame older than this when a worker picks it
    /// up is dropped without processing (milliseconds)
    #[serde(default = "default_max_allowed_delay_ms")]
    #[validate(range(min = 1))]
    pub max_allowed_delay_ms: u64,

    /// Blocking-read timeout for every pipeline loop (milliseconds);
    /// bounds how long a shutdown request can go unobserved
    #[serde(default = "default_queue_timeout_ms")]
    #[validate(range(min = 10))]
    pub queue_timeout_ms: u64,

    /// Capacity of each fabric channel (work and results)
    #[serde(default = "default_fabric_capacity")]
    #[validate(range(min = 1))]
    pub fabric_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_allowed_delay_ms: default_max_allowed_delay_ms(),
            queue_timeout_ms: default_queue_timeout_ms(),
            fabric_capacity: default_fabric_capacity(),
        }
    }
}

impl PipelineSettings {
    /// Staleness budget as a [`Duration`]
    pub fn max_allowed_delay(&self) -> Duration {
        Duration::from_millis(self.max_allowed_delay_ms)
    }

    /// Loop read timeout as a [`Duration`]
    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }
}

/// Transform settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransformSettings {
    /// Which transform the workers apply
    #[serde(default)]
    pub kind: TransformKind,

    /// JPEG re-encode quality for the invert transform (1-100)
    #[serde(default = "default_jpeg_quality")]
    #[validate(range(min = 1, max = 100))]
    pub jpeg_quality: u8,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            kind: TransformKind::default(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Transform selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Decode JPEG, invert colors, re-encode JPEG
    #[default]
    Invert,
    /// Identity transform (testing / throughput measurement)
    Passthrough,
}

fn default_listen_addr() -> String {
    "127.0.0.1:9500".to_string()
}

fn default_max_frame_len() -> usize {
    8 * 1024 * 1024
}

fn default_egress_poll_ms() -> u64 {
    20
}

fn default_worker_count() -> usize {
    4
}

fn default_max_allowed_delay_ms() -> u64 {
    1_000
}

fn default_queue_timeout_ms() -> u64 {
    1_000
}

fn default_fabric_capacity() -> usize {
    64
}

fn default_jpeg_quality() -> u8 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.pipeline.worker_count, 4);
        assert_eq!(config.pipeline.max_allowed_delay(), Duration::from_secs(1));
        assert_eq!(config.pipeline.queue_timeout(), Duration::from_secs(1));
        assert_eq!(config.transform.kind, TransformKind::Invert);
        assert_eq!(config.transform.jpeg_quality, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RelayConfig =
            serde_json::from_str(r#"{"pipeline": {"worker_count": 8}}"#).unwrap();
        assert_eq!(config.pipeline.worker_count, 8);
        assert_eq!(config.pipeline.fabric_capacity, 64);
        assert_eq!(config.gateway.listen_addr, "127.0.0.1:9500");
    }

    #[test]
    fn test_validation_rejects_zero_workers() {
        let config: RelayConfig =
            serde_json::from_str(r#"{"pipeline": {"worker_count": 0}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transform_kind_snake_case() {
        let settings: TransformSettings =
            serde_json::from_str(r#"{"kind": "passthrough"}"#).unwrap();
        assert_eq!(settings.kind, TransformKind::Passthrough);
    }
}
