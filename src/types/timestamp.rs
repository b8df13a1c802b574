use chrono::Utc;
use crate::error::{Error, Result};

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_unix_secs() -> i64 {
    Utc::now().timestamp()
}

/// Parses a decimal seconds-since-epoch string as received at the API boundary.
pub fn parse_unix_secs(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidTimestamp(raw.to_string()))
}
