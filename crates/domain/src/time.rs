//! Wall-clock timestamps for trigger events.
//!
//! Timestamps are informational only: trigger conditions never look at the
//! wall clock, time-based triggers work on the signal value itself.

use chrono::{DateTime, Utc};

/// UTC timestamp recorded when a trigger fires.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
