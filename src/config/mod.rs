use std::time::Duration;
use serde::{Deserialize, Serialize};

pub mod feed;
pub mod storage;
pub mod loader;

pub use feed::CoingeckoConfig;
pub use loader::AppConfig;
pub use storage::{StorageBackend, StorageConfig};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Used when a symbol is added without a positive period.
    pub default_period_secs: u64,
    /// Upper bound on a single price fetch inside a poller tick.
    pub fetch_timeout_secs: u64,
}

impl CollectorConfig {
    pub fn default_period(&self) -> Duration {
        Duration::from_secs(self.default_period_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            default_period_secs: 60,
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// `trace` | `debug` | `info` | `warn` | `error`; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}
