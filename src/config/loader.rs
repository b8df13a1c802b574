use std::path::Path;
use crate::collector::poller::MAX_PERIOD;
use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub collector: CollectorConfig,
    pub coingecko: CoingeckoConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Layers `config/default`, `config/{env}` and `OBSERVER__*` environment
    /// variables, in that order.
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from(Path::new("config"), env)
    }

    pub fn load_from(dir: &Path, env: &str) -> Result<Self> {
        let default_file = dir.join("default");
        let env_file = dir.join(env);

        let config = Config::builder()
            .add_source(File::with_name(&default_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("OBSERVER").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collector.default_period_secs == 0 {
            return Err(Error::ConfigError("collector.default_period_secs must be positive".to_string()));
        }
        if self.collector.default_period() > MAX_PERIOD {
            return Err(Error::ConfigError(format!(
                "collector.default_period_secs must be at most {}",
                MAX_PERIOD.as_secs()
            )));
        }
        if self.collector.fetch_timeout_secs == 0 {
            return Err(Error::ConfigError("collector.fetch_timeout_secs must be positive".to_string()));
        }
        if self.coingecko.timeout_secs == 0 {
            return Err(Error::ConfigError("coingecko.timeout_secs must be positive".to_string()));
        }
        if self.coingecko.base_url.trim().is_empty() {
            return Err(Error::ConfigError("coingecko.base_url is required".to_string()));
        }
        if self.server.addr.trim().is_empty() {
            return Err(Error::ConfigError("server.addr is required".to_string()));
        }
        Ok(())
    }
}
