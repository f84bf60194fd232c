//! Time and timestamp helpers.
//!
//! Persisted timestamps are plain epoch milliseconds so that stored rules
//! keep their exact integer representation across round trips.

use chrono::Utc;

/// Milliseconds since the Unix epoch (UTC).
pub type EpochMillis = i64;

/// Return the current UTC time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> EpochMillis {
    Utc::now().timestamp_millis()
}

/// Length of `n` minutes in milliseconds.
#[must_use]
pub const fn minutes(n: i64) -> EpochMillis {
    n * 60 * 1000
}
