use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LogConfig;
use crate::error::{Error, Result};

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::ConfigError(format!("invalid log level {:?}: {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| Error::ConfigError(format!("tracing init failed: {}", e)))
}

pub fn poller_span(symbol: &str) -> Span {
    tracing::info_span!(
        "poller",
        symbol = %symbol,
    )
}

pub fn lookup_span(symbol: &str, ts: i64) -> Span {
    tracing::debug_span!(
        "price_lookup",
        symbol = %symbol,
        ts,
    )
}
