use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::utils::constants::EXPIRES_ON_FORMAT;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Whole-second UTC instant for a Unix timestamp, if chrono can represent it.
pub fn from_unix_secs(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// `YYYY-MM-DD HH:MM:SS`, always UTC
pub fn format_expires_on(expires_on: &DateTime<Utc>) -> String {
    expires_on.format(EXPIRES_ON_FORMAT).to_string()
}
