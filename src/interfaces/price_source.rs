use async_trait::async_trait;
use crate::error::Result;
use crate::types::Price;

/// A feed that returns one current price observation per call.
///
/// Implementations are shared between pollers, so `fetch` takes `&self` and
/// must be safe to call concurrently for different ids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Maps a user-facing ticker to the identifier this source expects.
    /// Unknown tickers pass through unchanged.
    fn resolve_id(&self, symbol: &str) -> String {
        symbol.to_string()
    }

    async fn fetch(&self, id: &str) -> Result<Price>;
}
