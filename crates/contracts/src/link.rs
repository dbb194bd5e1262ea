//! FrameLink trait - the client-facing binary message stream.

use bytes::Bytes;

use crate::RelayError;

/// Bidirectional binary message stream to one client.
///
/// One message = one frame payload; the transport's own message boundaries
/// are the only framing. The pipeline core never touches the transport
/// directly, only this trait.
#[trait_variant::make(FrameLink: Send)]
pub trait LocalFrameLink {
    /// Receive the next inbound payload; `Ok(None)` means the connection closed
    async fn recv(&mut self) -> Result<Option<Bytes>, RelayError>;

    /// Send one outbound payload
    ///
    /// # Errors
    /// Returns [`RelayError::ConnectionClosed`] or an IO error when the
    /// peer is gone; the session treats either as end of connection.
    async fn send(&mut self, payload: Bytes) -> Result<(), RelayError>;
}
