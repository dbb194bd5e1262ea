//! In-memory frame link for tests and demos.

use bytes::Bytes;
use tokio::sync::mpsc;

use contracts::{FrameLink, RelayError};

/// Create a connected (server link, client peer) pair
pub fn loopback_pair(capacity: usize) -> (LoopbackLink, LoopbackPeer) {
    let (to_server_tx, to_server_rx) = mpsc::channel(capacity);
    let (to_client_tx, to_client_rx) = mpsc::channel(capacity);
    (
        LoopbackLink {
            rx: to_server_rx,
            tx: to_client_tx,
        },
        LoopbackPeer {
            tx: to_server_tx,
            rx: to_client_rx,
        },
    )
}

/// Server-side loopback link; implements [`FrameLink`]
pub struct LoopbackLink {
    rx: mpsc::Receiver<Bytes>,
    tx: mpsc::Sender<Bytes>,
}

impl FrameLink for LoopbackLink {
    async fn recv(&mut self) -> Result<Option<Bytes>, RelayError> {
        Ok(self.rx.recv().await)
    }

    async fn send(&mut self, payload: Bytes) -> Result<(), RelayError> {
        self.tx
            .send(payload)
            .await
            .map_err(|_| RelayError::ConnectionClosed)
    }
}

/// Client side of a loopback pair; the "producing client" in tests
pub struct LoopbackPeer {
    tx: mpsc::Sender<Bytes>,
    rx: mpsc::Receiver<Bytes>,
}

impl LoopbackPeer {
    /// Send one frame payload to the gateway
    pub async fn send(&self, payload: Bytes) -> Result<(), RelayError> {
        self.tx
            .send(payload)
            .await
            .map_err(|_| RelayError::ConnectionClosed)
    }

    /// Receive the next processed payload
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Receive without waiting
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }

    /// Close the connection (drops the sending half)
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loopback_round_trip() {
        let (mut link, mut peer) = loopback_pair(4);

        peer.send(Bytes::from_static(b"in")).await.unwrap();
        assert_eq!(link.recv().await.unwrap(), Some(Bytes::from_static(b"in")));

        link.send(Bytes::from_static(b"out")).await.unwrap();
        assert_eq!(peer.recv().await, Some(Bytes::from_static(b"out")));
    }

    #[tokio::test]
    async fn test_peer_close_ends_link() {
        let (mut link, peer) = loopback_pair(4);
        peer.close();
        assert_eq!(link.recv().await.unwrap(), None);
    }
}
