//! Configuration validation
//!
//! Field-level checks come from the `validator` derives on the config
//! types; cross-field checks live here.

use std::net::SocketAddr;

use contracts::{RelayConfig, RelayError};
use validator::Validate;

/// Validate a parsed configuration
pub fn validate(config: &RelayConfig) -> Result<(), RelayError> {
    config.validate().map_err(|e| {
        let field = e
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "config".to_string());
        RelayError::config_validation(field, e.to_string())
    })?;

    validate_listen_addr(config)?;
    validate_timing(config)?;

    Ok(())
}

/// The listen address must be a parseable socket address
fn validate_listen_addr(config: &RelayConfig) -> Result<(), RelayError> {
    config
        .gateway
        .listen_addr
        .parse::<SocketAddr>()
        .map_err(|e| {
            RelayError::config_validation(
                "gateway.listen_addr",
                format!("'{}' is not a socket address: {e}", config.gateway.listen_addr),
            )
        })?;
    Ok(())
}

/// The egress poll must be shorter than the staleness budget, otherwise
/// every result would already be stale when the timer drains it
fn validate_timing(config: &RelayConfig) -> Result<(), RelayError> {
    if config.gateway.egress_poll_ms >= config.pipeline.max_allowed_delay_ms {
        return Err(RelayError::config_validation(
            "gateway.egress_poll_ms",
            format!(
                "egress poll ({}ms) must be below the staleness budget ({}ms)",
                config.gateway.egress_poll_ms, config.pipeline.max_allowed_delay_ms
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_listen_addr_rejected() {
        let mut config = RelayConfig::default();
        config.gateway.listen_addr = "not-an-address".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("listen_addr"));
    }

    #[test]
    fn test_egress_poll_must_undercut_staleness_budget() {
        let mut config = RelayConfig::default();
        config.gateway.egress_poll_ms = 500;
        config.pipeline.max_allowed_delay_ms = 100;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("egress_poll_ms"));
    }

    #[test]
    fn test_zero_delay_rejected_by_derive() {
        let mut config = RelayConfig::default();
        config.pipeline.max_allowed_delay_ms = 0;
        assert!(validate(&config).is_err());
    }
}
