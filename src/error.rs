use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Input Errors
    #[error("Symbol is required")]
    EmptySymbol,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Polling period of {0}s is out of range")]
    InvalidPeriod(i64),

    // Query Errors
    #[error("No price for {symbol} at or before {timestamp}")]
    PriceNotFound {
        symbol: String,
        timestamp: i64,
    },

    // Price Source Errors
    #[error("Price source error: {0}")]
    PriceSource(String),

    #[error("Malformed price response: {0}")]
    MalformedResponse(String),

    #[error("Price fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    // Storage Errors
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::PriceNotFound { .. })
    }

    /// Errors caused by the caller's arguments rather than by the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::EmptySymbol | Error::InvalidTimestamp(_) | Error::InvalidPeriod(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_not_found_and_invalid_input() {
        let not_found = Error::PriceNotFound { symbol: "btc".into(), timestamp: 50 };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_invalid_input());
        assert_eq!(not_found.to_string(), "No price for btc at or before 50");

        assert!(Error::EmptySymbol.is_invalid_input());
        assert!(Error::InvalidTimestamp("abc".into()).is_invalid_input());
        assert!(Error::InvalidPeriod(i64::MAX).is_invalid_input());
        assert!(!Error::StorageError("disk".into()).is_not_found());
    }
}
