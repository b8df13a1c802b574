use std::sync::Arc;
use crate::collector::Registry;
use crate::config::CollectorConfig;
use crate::core::price_query::PriceQuery;
use crate::error::{Error, Result};
use crate::interfaces::{PriceSource, SampleStore};
use crate::price_infra::canonical_symbol;
use crate::types::Sample;

/// Entry point for callers such as the REST layer.
///
/// Symbols are canonicalised (trimmed, lowercased) here, so "BTC" and "btc"
/// share one poller and one sample series.
pub struct CurrencyService {
    registry: Registry,
    query: PriceQuery,
}

impl CurrencyService {
    pub fn new(
        store: Arc<dyn SampleStore>,
        source: Arc<dyn PriceSource>,
        config: &CollectorConfig,
    ) -> Self {
        Self::from_parts(
            Registry::new(Arc::clone(&store), source, config),
            PriceQuery::new(store),
        )
    }

    pub fn from_parts(registry: Registry, query: PriceQuery) -> Self {
        CurrencyService { registry, query }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Errors only on an empty symbol.
    pub fn add_currency(&self, symbol: &str, period_secs: i64) -> Result<()> {
        let symbol = canonical_symbol(symbol);
        if symbol.is_empty() {
            return Err(Error::EmptySymbol);
        }
        self.registry.add(&symbol, period_secs)
    }

    /// Always succeeds; untracked or empty symbols are a no-op.
    pub fn remove_currency(&self, symbol: &str) -> Result<()> {
        let symbol = canonical_symbol(symbol);
        if symbol.is_empty() {
            return Ok(());
        }
        self.registry.remove(&symbol)
    }

    pub async fn get_price(&self, symbol: &str, ts: Option<i64>) -> Result<Sample> {
        self.query.lookup(&canonical_symbol(symbol), ts).await
    }

    pub fn tracked_currencies(&self) -> Vec<String> {
        self.registry.tracked_symbols()
    }

    pub fn shutdown(&self) {
        self.registry.shutdown();
    }
}
