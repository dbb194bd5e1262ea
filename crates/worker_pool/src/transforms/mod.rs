//! Built-in frame transforms.

mod invert;
mod passthrough;

pub use invert::InvertTransform;
pub use passthrough::PassthroughTransform;

use bytes::Bytes;
use contracts::{FrameTransform, RelayError, TransformKind, TransformSettings};

/// Transform selected from configuration
pub enum BuiltinTransform {
    Invert(InvertTransform),
    Passthrough(PassthroughTransform),
}

impl BuiltinTransform {
    /// Build the transform described by `settings`
    pub fn from_settings(settings: &TransformSettings) -> Self {
        match settings.kind {
            TransformKind::Invert => Self::Invert(InvertTransform::new(settings.jpeg_quality)),
            TransformKind::Passthrough => Self::Passthrough(PassthroughTransform),
        }
    }
}

impl FrameTransform for BuiltinTransform {
    fn name(&self) -> &str {
        match self {
            Self::Invert(t) => t.name(),
            Self::Passthrough(t) => t.name(),
        }
    }

    async fn apply(&mut self, payload: Bytes) -> Result<Bytes, RelayError> {
        match self {
            Self::Invert(t) => t.apply(payload).await,
            Self::Passthrough(t) => t.apply(payload).await,
        }
    }
}
