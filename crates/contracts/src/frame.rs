//! Frame - the unit of data flowing through the pipeline.

use bytes::Bytes;

use crate::Timestamp;

/// A stamped frame: opaque payload plus its capture timestamp.
///
/// Immutable value object; no identity beyond `(captured_at, payload)`.
/// This is the unit carried on the messaging fabric (both directions)
/// and on the egress queue.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture timestamp, assigned when the frame was accepted
    pub captured_at: Timestamp,

    /// Opaque byte payload (raw or encoded media)
    pub payload: Bytes,
}

impl Frame {
    /// Create a stamped frame
    pub fn new(captured_at: Timestamp, payload: Bytes) -> Self {
        Self {
            captured_at,
            payload,
        }
    }
}

/// A frame as read off the client connection, before pipeline acceptance.
///
/// The gateway may pre-stamp it (`stamp_on_receive`); otherwise the
/// distributor assigns `captured_at` at the moment it accepts the frame.
#[derive(Debug, Clone)]
pub struct InboundFrame {
    /// Opaque byte payload
    pub payload: Bytes,

    /// Capture timestamp, if the gateway stamped the frame on receive
    pub captured_at: Option<Timestamp>,
}

impl InboundFrame {
    /// Inbound frame without a gateway stamp
    pub fn unstamped(payload: Bytes) -> Self {
        Self {
            payload,
            captured_at: None,
        }
    }

    /// Inbound frame stamped at the gateway
    pub fn stamped(payload: Bytes, captured_at: Timestamp) -> Self {
        Self {
            payload,
            captured_at: Some(captured_at),
        }
    }

    /// Convert into a stamped [`Frame`], using `fallback` when unstamped
    pub fn into_frame(self, fallback: Timestamp) -> Frame {
        Frame {
            captured_at: self.captured_at.unwrap_or(fallback),
            payload: self.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_frame_keeps_gateway_stamp() {
        let inbound = InboundFrame::stamped(Bytes::from_static(b"x"), Timestamp::from_micros(5));
        let frame = inbound.into_frame(Timestamp::from_micros(99));
        assert_eq!(frame.captured_at, Timestamp::from_micros(5));
    }

    #[test]
    fn test_into_frame_uses_fallback_when_unstamped() {
        let inbound = InboundFrame::unstamped(Bytes::from_static(b"x"));
        let frame = inbound.into_frame(Timestamp::from_micros(99));
        assert_eq!(frame.captured_at, Timestamp::from_micros(99));
    }
}
