//! Queue overflow policy.

use serde::{Deserialize, Serialize};

/// What `put` does when a relay slot is already occupied.
///
/// Neither variant blocks the producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Refuse the incoming item; the resident item survives
    #[default]
    DropNewest,
    /// Evict the resident item; the incoming item replaces it
    OverwriteLatest,
}
