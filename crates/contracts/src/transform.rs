//! FrameTransform trait - the per-frame compute step applied by workers.

use bytes::Bytes;

use crate::RelayError;

/// Per-frame transform
///
/// Workers treat this as an opaque `bytes -> bytes` call. Implementations
/// must be pure with respect to pipeline state: no ordering responsibility,
/// no shared mutable state between workers.
#[trait_variant::make(FrameTransform: Send)]
pub trait LocalFrameTransform {
    /// Transform name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Transform one payload
    ///
    /// # Errors
    /// A failure applies to that frame only; the worker drops the frame
    /// and continues its loop.
    async fn apply(&mut self, payload: Bytes) -> Result<Bytes, RelayError>;
}
