use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Commit time as reported by the ledger substrate.
///
/// Mirrors the seconds/nanos layout substrates commonly use on the wire.
/// Values are not validated on construction; [`CommitTimestamp::to_datetime`]
/// rejects anything outside the representable range.
///
/// Ordering: `seconds` → `nanos`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitTimestamp {
    /// Seconds since the UNIX epoch.
    pub seconds: i64,
    /// Sub-second component, expected in `0..1_000_000_000`.
    pub nanos: i32,
}

impl CommitTimestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Timestamp for the current wall-clock time.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: elapsed.as_secs() as i64,
            nanos: elapsed.subsec_nanos() as i32,
        }
    }

    /// Returns `true` if the nanos component is in range.
    pub fn is_valid(&self) -> bool {
        (0..NANOS_PER_SECOND).contains(&self.nanos)
    }

    /// Convert to a UTC date-time, validating both components.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, TypeError> {
        let invalid = || TypeError::InvalidTimestamp {
            seconds: self.seconds,
            nanos: self.nanos,
        };
        if !self.is_valid() {
            return Err(invalid());
        }
        DateTime::from_timestamp(self.seconds, self.nanos as u32).ok_or_else(invalid)
    }
}

impl From<DateTime<Utc>> for CommitTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos() as i32,
        }
    }
}

impl fmt::Display for CommitTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}
