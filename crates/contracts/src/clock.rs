//! Monotonic pipeline clock and timestamp model.

use std::fmt;
use std::time::{Duration, Instant};

/// Capture timestamp: microseconds since the pipeline clock epoch.
///
/// Fixed-width numeric, totally ordered. The pipeline never compares
/// timestamps from different clock instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from raw microseconds
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create a timestamp from milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    /// Raw microsecond value
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Elapsed duration from `earlier` to `self` (zero if `earlier` is newer)
    pub fn saturating_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Monotonic clock owned by a pipeline instance.
///
/// All components of one pipeline share the same clock (`Arc<RelayClock>`),
/// so `elapsed_since` gives the true age of a frame regardless of which
/// task stamped it.
#[derive(Debug)]
pub struct RelayClock {
    epoch: Instant,
}

impl RelayClock {
    /// Create a clock with epoch = now
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Current timestamp
    pub fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.epoch.elapsed().as_micros() as u64)
    }

    /// Age of a timestamp relative to now (zero for future stamps)
    pub fn elapsed_since(&self, ts: Timestamp) -> Duration {
        self.now().saturating_since(ts)
    }
}

impl Default for RelayClock {
    fn default() -> Self {
        Self::new()
    }
}
