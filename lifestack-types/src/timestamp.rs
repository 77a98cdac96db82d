//! Wall-clock timestamps for sync bookkeeping.
//!
//! The state layer needs to answer one question about time: "how long ago
//! did this manager last synchronize?". A plain millisecond wall-clock value
//! is enough for that; causal ordering between events is carried by the
//! event queue itself (FIFO per manager), not by the timestamp.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A wall-clock timestamp in milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp at the current time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(millis)
    }

    /// Creates a timestamp from raw milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the raw milliseconds since the Unix epoch.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the duration elapsed since this timestamp.
    ///
    /// Saturates to zero if the timestamp is in the future (clock skew).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let now = Self::now();
        Duration::from_millis(now.0.saturating_sub(self.0))
    }

    /// Returns true if this timestamp is older than the given age.
    #[must_use]
    pub fn is_older_than(&self, age: Duration) -> bool {
        self.elapsed() > age
    }

    /// Returns a timestamp shifted into the past by the given duration.
    /// Mostly useful for constructing staleness scenarios in tests.
    #[must_use]
    pub fn minus(&self, ago: Duration) -> Self {
        Self(self.0.saturating_sub(ago.as_millis() as u64))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
