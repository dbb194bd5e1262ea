//! Process-wide shutdown flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative shutdown flag shared by every pipeline loop.
///
/// Loops block only on reads with a timeout and check this flag at each
/// timeout boundary, so a triggered shutdown is observed within one
/// timeout period by every component.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    /// Create an untriggered shutdown flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown; idempotent
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
