//! Messaging fabric: the fan-out "work" channel and fan-in "results" channel.
//!
//! Both channels are bounded MPMC: every item is delivered to exactly one
//! receiver (push/pull, no broadcast), which is what load-balances the
//! worker pool without any per-worker state. Producers never wait; a full
//! channel is reported as an outcome and the frame is dropped upstream.

use std::time::Duration;

use async_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use contracts::Frame;
use thiserror::Error;

/// Fabric setup failure; pipeline startup fails outright, no degraded mode
#[derive(Debug, Error)]
pub enum FabricError {
    /// Invalid channel capacity
    #[error("invalid fabric capacity {capacity}: must be at least 1")]
    InvalidCapacity { capacity: usize },
}

/// Result of a non-blocking fabric send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Accepted by the channel
    Sent,
    /// Channel full; the frame was dropped
    Full,
    /// All consumers are gone
    Disconnected,
}

/// Result of a fabric receive with timeout
#[derive(Debug)]
pub enum RecvOutcome {
    /// A frame arrived
    Frame(Frame),
    /// Nothing ready within the timeout; not an error
    TimedOut,
    /// All producers are gone
    Disconnected,
}

/// The two channels connecting distributor, worker pool, and collector
pub struct Fabric {
    work_tx: Sender<Frame>,
    work_rx: Receiver<Frame>,
    result_tx: Sender<Frame>,
    result_rx: Receiver<Frame>,
}

impl Fabric {
    /// Open both fabric channels with the given per-channel capacity
    pub fn open(capacity: usize) -> Result<Self, FabricError> {
        if capacity == 0 {
            return Err(FabricError::InvalidCapacity { capacity });
        }
        let (work_tx, work_rx) = bounded(capacity);
        let (result_tx, result_rx) = bounded(capacity);
        Ok(Self {
            work_tx,
            work_rx,
            result_tx,
            result_rx,
        })
    }

    /// Endpoint the distributor publishes work on
    pub fn work_producer(&self) -> WorkProducer {
        WorkProducer(self.work_tx.clone())
    }

    /// Endpoint a worker pulls work from; each frame goes to exactly one worker
    pub fn work_consumer(&self) -> WorkConsumer {
        WorkConsumer(self.work_rx.clone())
    }

    /// Endpoint a worker publishes results on
    pub fn result_producer(&self) -> ResultProducer {
        ResultProducer(self.result_tx.clone())
    }

    /// Endpoint the collector pulls results from
    pub fn result_consumer(&self) -> ResultConsumer {
        ResultConsumer(self.result_rx.clone())
    }
}

/// Fan-out sender (distributor side)
#[derive(Clone)]
pub struct WorkProducer(Sender<Frame>);

impl WorkProducer {
    /// Publish a frame without waiting
    pub fn publish(&self, frame: Frame) -> SendOutcome {
        try_send(&self.0, frame)
    }
}

/// Fan-out receiver (worker side)
#[derive(Clone)]
pub struct WorkConsumer(Receiver<Frame>);

impl WorkConsumer {
    /// Pull the next work frame, waiting up to `timeout`
    pub async fn recv(&self, timeout: Duration) -> RecvOutcome {
        recv_with_timeout(&self.0, timeout).await
    }
}

/// Fan-in sender (worker side)
#[derive(Clone)]
pub struct ResultProducer(Sender<Frame>);

impl ResultProducer {
    /// Publish a result without waiting
    pub fn publish(&self, frame: Frame) -> SendOutcome {
        try_send(&self.0, frame)
    }
}

/// Fan-in receiver (collector side)
#[derive(Clone)]
pub struct ResultConsumer(Receiver<Frame>);

impl ResultConsumer {
    /// Pull the next result frame, waiting up to `timeout`
    pub async fn recv(&self, timeout: Duration) -> RecvOutcome {
        recv_with_timeout(&self.0, timeout).await
    }

    /// Pull a result without waiting (tests/diagnostics)
    pub fn try_recv(&self) -> Option<Frame> {
        self.0.try_recv().ok()
    }
}

fn try_send(tx: &Sender<Frame>, frame: Frame) -> SendOutcome {
    match tx.try_send(frame) {
        Ok(()) => SendOutcome::Sent,
        Err(TrySendError::Full(_)) => SendOutcome::Full,
        Err(TrySendError::Closed(_)) => SendOutcome::Disconnected,
    }
}

async fn recv_with_timeout(rx: &Receiver<Frame>, timeout: Duration) -> RecvOutcome {
    // Fast path avoids the timer when a frame is already queued
    match rx.try_recv() {
        Ok(frame) => return RecvOutcome::Frame(frame),
        Err(TryRecvError::Closed) => return RecvOutcome::Disconnected,
        Err(TryRecvError::Empty) => {}
    }
    match tokio::time::timeout(timeout, rx.recv()).await {
        Ok(Ok(frame)) => RecvOutcome::Frame(frame),
        Ok(Err(_)) => RecvOutcome::Disconnected,
        Err(_) => RecvOutcome::TimedOut,
    }
}
