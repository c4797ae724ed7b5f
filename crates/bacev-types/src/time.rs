//! # bacev-types::time
//!
//! Defines the timestamp representation used for event transitions.
//! Timestamps are wall-clock nanoseconds since the Unix epoch in a `u128`,
//! which gives plenty of resolution for ordering transitions without
//! pulling in a calendar library.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A wall-clock timestamp, in nanoseconds since the Unix epoch.
///
/// The zero value doubles as the "unspecified" initial condition of the
/// per-group event timestamp arrays: no transition has been recorded yet.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeStamp(pub u128);

impl TimeStamp {
    /// The initial condition: no transition recorded.
    pub const UNSPECIFIED: TimeStamp = TimeStamp(0);

    /// Reads the platform clock.
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| TimeStamp(d.as_nanos()))
            .unwrap_or(TimeStamp::UNSPECIFIED)
    }

    /// Builds a timestamp from whole milliseconds since the epoch.
    pub fn from_millis(ms: u64) -> Self {
        TimeStamp((ms as u128) * 1_000_000)
    }

    /// True for the initial, never-stamped condition.
    pub fn is_unspecified(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            write!(f, "unspecified")
        } else {
            write!(f, "{}.{:09}s", self.0 / 1_000_000_000, self.0 % 1_000_000_000)
        }
    }
}
