//! Configuration parsing
//!
//! Supports TOML (primary) and JSON formats.

use contracts::{RelayConfig, RelayError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<RelayConfig, RelayError> {
    toml::from_str(content).map_err(|e| RelayError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<RelayConfig, RelayError> {
    serde_json::from_str(content).map_err(|e| RelayError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RelayConfig, RelayError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use contracts::TransformKind;

    use super::*;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[gateway]
listen_addr = "0.0.0.0:7000"
stamp_on_receive = true

[transform]
kind = "passthrough"
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.gateway.listen_addr, "0.0.0.0:7000");
        assert!(config.gateway.stamp_on_receive);
        assert_eq!(config.transform.kind, TransformKind::Passthrough);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "pipeline": { "worker_count": 6, "fabric_capacity": 16 }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.pipeline.worker_count, 6);
        assert_eq!(config.pipeline.fabric_capacity, 16);
    }

    #[test]
    fn test_parse_toml_invalid() {
        let result = parse_toml("pipeline = 3");
        assert!(result.is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
