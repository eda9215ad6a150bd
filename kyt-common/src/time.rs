//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds elapsed between two timestamps, clamped at zero.
///
/// Clock skew between the persistence layer and the reading process can
/// make `b` appear earlier than `a`; a derived elapsed value must never go
/// negative.
pub fn elapsed_ms(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    (b - a).num_milliseconds().max(0)
}

/// Convert whole hours to milliseconds (SLA thresholds are configured in hours)
pub fn hours_to_ms(hours: i64) -> i64 {
    hours * 3_600_000
}
