//! Wall-clock timestamp used for Last-Writer-Wins ordering.
//!
//! Unlike `privstack`'s `HybridTimestamp`, this system's Non-goals
//! explicitly exclude causal/vector-clock ordering (spec.md §1):
//! wall-clock seconds are authoritative on their own.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, as observed at detection time (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallClock(u64);

impl WallClock {
    /// Captures the current wall-clock second.
    #[must_use]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_secs();
        Self(secs)
    }

    /// Wraps an explicit second count (for tests and wire decoding).
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the raw seconds-since-epoch value.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::now()
    }
}

impl From<u64> for WallClock {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}
