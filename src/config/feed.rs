use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CoingeckoConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl CoingeckoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CoingeckoConfig {
    fn default() -> Self {
        CoingeckoConfig {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            timeout_secs: 5,
        }
    }
}
