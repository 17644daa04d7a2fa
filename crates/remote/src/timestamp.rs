//! The remote store's native timestamp representation.
//!
//! The remote store persists instants as a `{seconds, nanos}` pair rather
//! than as RFC 3339 strings. Conversion to and from [`DateTime<Utc>`]
//! happens at the store boundary; everything above it works in chrono
//! types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An instant as stored by the remote document store.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use tack_remote::RemoteTimestamp;
///
/// let now = Utc::now();
/// let ts = RemoteTimestamp::from_datetime(now);
/// assert_eq!(ts.to_datetime(), Some(now));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTimestamp {
    /// Whole seconds since the Unix epoch.
    pub seconds: i64,
    /// Sub-second nanoseconds.
    pub nanos: u32,
}

impl RemoteTimestamp {
    /// Converts a chrono instant into the remote representation.
    #[must_use]
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }

    /// Converts back into a chrono instant.
    ///
    /// Returns `None` if the pair is out of chrono's representable range
    /// (which only happens with corrupted documents).
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }
}

impl From<DateTime<Utc>> for RemoteTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_datetime(value)
    }
}
