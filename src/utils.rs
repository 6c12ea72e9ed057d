//! Utility functions for the match lifecycle layer

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Generate a new unique match ID
pub fn generate_match_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a new unique application ID
pub fn generate_application_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Check whether a timestamp falls on the given calendar day (UTC),
/// ignoring time-of-day
pub fn same_calendar_day(timestamp: DateTime<Utc>, day: NaiveDate) -> bool {
    timestamp.date_naive() == day
}
