//! Layered error definitions
//!
//! Categorized by source: config / fabric / transform / link

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum RelayError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Fabric Errors =====
    /// Messaging fabric could not be set up; pipeline startup fails outright
    #[error("fabric setup error: {message}")]
    FabricSetup { message: String },

    // ===== Transform Errors =====
    /// Transform failed for a single frame; the worker drops the frame and continues
    #[error("transform '{transform}' failed: {message}")]
    TransformFailed { transform: String, message: String },

    // ===== Link Errors =====
    /// Inbound message larger than the configured frame limit
    #[error("frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },

    /// The client connection was closed
    #[error("connection closed")]
    ConnectionClosed,

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl RelayError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create fabric setup error
    pub fn fabric_setup(message: impl Into<String>) -> Self {
        Self::FabricSetup {
            message: message.into(),
        }
    }

    /// Create transform failure error
    pub fn transform_failed(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransformFailed {
            transform: transform.into(),
            message: message.into(),
        }
    }
}
