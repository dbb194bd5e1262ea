//! Explicit registry of live sessions.
//!
//! Owned by the process-lifecycle component and passed by handle to
//! whoever needs to enumerate or close sessions; never ambient global
//! state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use contracts::Shutdown;
use tracing::debug;

/// Tracks every live session's shutdown handle
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<u64, Shutdown>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a session id
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a session's shutdown handle
    pub fn register(&self, session_id: u64, shutdown: Shutdown) {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(session_id, shutdown);
        debug!(session_id, "session registered");
    }

    /// Remove a finished session
    pub fn deregister(&self, session_id: u64) {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .remove(&session_id);
        debug!(session_id, "session deregistered");
    }

    /// Number of live sessions
    pub fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .len()
    }

    /// Ask every live session to stop
    pub fn close_all(&self) {
        for shutdown in self
            .sessions
            .lock()
            .expect("session registry poisoned")
            .values()
        {
            shutdown.trigger();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_deregister() {
        let registry = SessionRegistry::new();
        let id = registry.next_id();
        registry.register(id, Shutdown::new());
        assert_eq!(registry.active_count(), 1);
        registry.deregister(id);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_close_all_triggers_every_session() {
        let registry = SessionRegistry::new();
        let a = Shutdown::new();
        let b = Shutdown::new();
        registry.register(registry.next_id(), a.clone());
        registry.register(registry.next_id(), b.clone());

        registry.close_all();
        assert!(a.is_triggered());
        assert!(b.is_triggered());
    }
}
