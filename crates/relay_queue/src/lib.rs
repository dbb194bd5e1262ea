//! Bounded relay queue: a capacity-1 hand-off slot.
//!
//! The pipeline never buffers more than the single most-recent item at any
//! stage; older frames only add end-to-end latency. The slot is an atomic
//! cell guarded by one lock, so concurrent producers cannot interleave a
//! get-then-put; overwrite is last-writer-wins under the lock.

use std::sync::Mutex;
use std::time::Duration;

use contracts::OverflowPolicy;
use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

/// Result of a [`RelaySlot::put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The slot was empty; the item is now resident
    Stored,
    /// Overwrite-latest evicted the resident item in favor of this one
    Replaced,
    /// Drop-newest refused the incoming item; the resident item survives
    Rejected,
}

/// Capacity-1 thread-safe queue with a configurable overflow policy.
///
/// `put` never blocks; `get` never blocks past its timeout. A timed-out
/// or empty read is a normal "nothing ready" signal, not an error.
#[derive(Debug)]
pub struct RelaySlot<T> {
    slot: Mutex<Option<T>>,
    notify: Notify,
    policy: OverflowPolicy,
}

impl<T> RelaySlot<T> {
    /// Create an empty slot with the given overflow policy
    pub fn new(policy: OverflowPolicy) -> Self {
        Self {
            slot: Mutex::new(None),
            notify: Notify::new(),
            policy,
        }
    }

    /// The slot's overflow policy
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Offer an item; never blocks
    pub fn put(&self, item: T) -> PutOutcome {
        let outcome = {
            let mut slot = self.slot.lock().expect("relay slot poisoned");
            match (slot.is_some(), self.policy) {
                (false, _) => {
                    *slot = Some(item);
                    PutOutcome::Stored
                }
                (true, OverflowPolicy::OverwriteLatest) => {
                    *slot = Some(item);
                    PutOutcome::Replaced
                }
                (true, OverflowPolicy::DropNewest) => PutOutcome::Rejected,
            }
        };
        if outcome != PutOutcome::Rejected {
            self.notify.notify_one();
        }
        outcome
    }

    /// Take the resident item without waiting
    pub fn try_get(&self) -> Option<T> {
        self.slot.lock().expect("relay slot poisoned").take()
    }

    /// Take the resident item, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` on timeout.
    pub async fn get(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = self.try_get() {
                return Some(item);
            }
            // notify_one stores a permit when no task is waiting, so a put
            // racing this gap is not lost
            if timeout_at(deadline, self.notify.notified()).await.is_err() {
                return self.try_get();
            }
        }
    }

    /// Discard the resident item, if any
    pub fn clear(&self) {
        self.slot.lock().expect("relay slot poisoned").take();
    }

    /// Number of resident items (0 or 1)
    pub fn len(&self) -> usize {
        usize::from(self.slot.lock().expect("relay slot poisoned").is_some())
    }

    /// Whether the slot is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
