//! Identity transform, for tests and throughput measurement.

use bytes::Bytes;
use contracts::{FrameTransform, RelayError};

/// Returns every payload unchanged
pub struct PassthroughTransform;

impl FrameTransform for PassthroughTransform {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn apply(&mut self, payload: Bytes) -> Result<Bytes, RelayError> {
        Ok(payload)
    }
}
