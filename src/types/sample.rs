use serde::{Deserialize, Serialize};
use crate::types::price::Price;

/// One persisted price observation. Never mutated once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub symbol: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub price: Price,
}

impl Sample {
    pub fn new(symbol: impl Into<String>, timestamp: i64, price: Price) -> Self {
        Sample {
            symbol: symbol.into(),
            timestamp,
            price,
        }
    }
}
