//! Gateway error types

use thiserror::Error;

/// Errors surfaced by the gateway listener
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Could not bind the listen address; pipeline startup fails
    #[error("failed to bind gateway listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Create a bind error
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
