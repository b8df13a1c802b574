use std::sync::Arc;
use tracing::{debug, error, Instrument};
use crate::error::{Error, Result};
use crate::interfaces::SampleStore;
use crate::observability::metrics::{PRICE_LOOKUPS, PRICE_LOOKUPS_NOT_FOUND};
use crate::observability::tracing::lookup_span;
use crate::types::Sample;
use crate::types::timestamp::now_unix_secs;

/// Closest-price-at-or-before lookups. Read-only and independent of whether a
/// poller for the symbol exists.
pub struct PriceQuery {
    store: Arc<dyn SampleStore>,
}

impl PriceQuery {
    pub fn new(store: Arc<dyn SampleStore>) -> Self {
        PriceQuery { store }
    }

    /// Latest sample for `symbol` not newer than `ts`; `None` means now.
    pub async fn lookup(&self, symbol: &str, ts: Option<i64>) -> Result<Sample> {
        if symbol.trim().is_empty() {
            return Err(Error::EmptySymbol);
        }
        let ts = ts.unwrap_or_else(now_unix_secs);

        async {
            PRICE_LOOKUPS.inc();
            match self.store.find_at_or_before(symbol, ts).await {
                Ok(Some(sample)) => Ok(sample),
                Ok(None) => {
                    PRICE_LOOKUPS_NOT_FOUND.inc();
                    debug!("no sample at or before timestamp");
                    Err(Error::PriceNotFound {
                        symbol: symbol.to_string(),
                        timestamp: ts,
                    })
                }
                Err(e) => {
                    error!(error = %e, "price lookup failed");
                    Err(e)
                }
            }
        }
        .instrument(lookup_span(symbol, ts))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use crate::interfaces::sample_store::MockSampleStore;
    use crate::storage::InMemorySampleStore;
    use crate::types::Price;

    fn usd(dollars: i64) -> Price {
        Price::from_cents(dollars * 100)
    }

    #[tokio::test]
    async fn closest_price_scenario() {
        let store = Arc::new(InMemorySampleStore::new());
        store.save(Sample::new("btc", 100, usd(50_000))).await.unwrap();
        store.save(Sample::new("btc", 200, usd(51_000))).await.unwrap();
        let query = PriceQuery::new(store);

        assert_eq!(query.lookup("btc", Some(150)).await.unwrap().timestamp, 100);
        assert_eq!(query.lookup("btc", Some(250)).await.unwrap().price, usd(51_000));

        let err = query.lookup("btc", Some(50)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn missing_timestamp_means_now() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let mut store = MockSampleStore::new();
        store.expect_find_at_or_before().returning(move |symbol, ts| {
            recorded.lock().unwrap().push((symbol.to_string(), ts));
            Ok(Some(Sample::new(symbol, 1, Price::from_cents(2))))
        });
        let query = PriceQuery::new(Arc::new(store));

        let before = now_unix_secs();
        let sample = query.lookup("btc", None).await.unwrap();
        assert_eq!(sample.price, Price::from_cents(2));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "btc");
        assert!((seen[0].1 - before).abs() <= 2, "ts should be near now");
    }

    #[tokio::test]
    async fn explicit_timestamp_is_passed_through() {
        let mut store = MockSampleStore::new();
        store.expect_find_at_or_before()
            .withf(|symbol, ts| symbol.to_string() == "eth" && *ts == 12345)
            .returning(|symbol, _| Ok(Some(Sample::new(symbol, 111, Price::from_cents(222)))));
        let query = PriceQuery::new(Arc::new(store));

        let sample = query.lookup("eth", Some(12345)).await.unwrap();
        assert_eq!(sample, Sample::new("eth", 111, Price::from_cents(222)));
    }

    #[tokio::test]
    async fn storage_failure_is_not_not_found() {
        let mut store = MockSampleStore::new();
        store.expect_find_at_or_before()
            .returning(|_, _| Err(Error::StorageError("db boom".to_string())));
        let query = PriceQuery::new(Arc::new(store));

        let err = query.lookup("btc", Some(100)).await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(err, Error::StorageError(_)));
    }

    #[tokio::test]
    async fn empty_symbol_never_reaches_store() {
        let mut store = MockSampleStore::new();
        store.expect_find_at_or_before().never();
        let query = PriceQuery::new(Arc::new(store));

        assert!(matches!(query.lookup(" ", Some(1)).await, Err(Error::EmptySymbol)));
    }
}
