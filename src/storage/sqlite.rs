use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use crate::error::{Error, Result};
use crate::interfaces::SampleStore;
use crate::types::{Price, Sample};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS prices (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol       TEXT    NOT NULL,
    ts           INTEGER NOT NULL,
    price_cents  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_prices_symbol_ts ON prices(symbol, ts DESC);
";

/// SQLite-backed sample store.
///
/// A single connection sits behind a mutex; every statement runs on the
/// blocking pool so pollers never stall the async runtime.
#[derive(Clone)]
pub struct SqliteSampleStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSampleStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened sqlite sample store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(SqliteSampleStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock()
                .map_err(|_| Error::StorageError("sqlite connection poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| Error::StorageError(format!("sqlite task failed: {}", e)))?
    }
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).map_err(|e| {
        tracing::error!(error = %e, "sqlite schema setup failed");
        Error::from(e)
    })
}

#[async_trait]
impl SampleStore for SqliteSampleStore {
    async fn save(&self, sample: Sample) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO prices (symbol, ts, price_cents) VALUES (?1, ?2, ?3)",
                params![sample.symbol, sample.timestamp, sample.price.cents()],
            )?;
            Ok(())
        })
        .await
    }

    async fn find_at_or_before(&self, symbol: &str, ts: i64) -> Result<Option<Sample>> {
        let symbol = symbol.to_string();
        self.with_conn(move |conn| {
            let found = conn
                .query_row(
                    "SELECT symbol, ts, price_cents
                     FROM prices
                     WHERE symbol = ?1 AND ts <= ?2
                     ORDER BY ts DESC, id DESC
                     LIMIT 1",
                    params![symbol, ts],
                    |row| {
                        Ok(Sample {
                            symbol: row.get(0)?,
                            timestamp: row.get(1)?,
                            price: Price::from_cents(row.get(2)?),
                        })
                    },
                )
                .optional()?;
            Ok(found)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(dollars: i64) -> Price {
        Price::from_cents(dollars * 100)
    }

    #[tokio::test]
    async fn closest_price_scenario() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        store.save(Sample::new("btc", 100, usd(50_000))).await.unwrap();
        store.save(Sample::new("btc", 200, usd(51_000))).await.unwrap();
        store.save(Sample::new("eth", 120, usd(3_000))).await.unwrap();

        let at_150 = store.find_at_or_before("btc", 150).await.unwrap().unwrap();
        assert_eq!(at_150, Sample::new("btc", 100, usd(50_000)));

        let at_250 = store.find_at_or_before("btc", 250).await.unwrap().unwrap();
        assert_eq!(at_250, Sample::new("btc", 200, usd(51_000)));

        assert!(store.find_at_or_before("btc", 50).await.unwrap().is_none());
        assert!(store.find_at_or_before("doge", 1_000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn timestamp_tie_returns_latest_insert() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        store.save(Sample::new("btc", 100, usd(1))).await.unwrap();
        store.save(Sample::new("btc", 100, usd(2))).await.unwrap();

        let found = store.find_at_or_before("btc", 100).await.unwrap().unwrap();
        assert_eq!(found.price, usd(2));
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prices.db");

        {
            let store = SqliteSampleStore::open(&path).unwrap();
            store.save(Sample::new("sol", 10, usd(150))).await.unwrap();
        }

        let reopened = SqliteSampleStore::open(&path).unwrap();
        let found = reopened.find_at_or_before("sol", 10).await.unwrap().unwrap();
        assert_eq!(found.price, usd(150));
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_samples() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        let mut handles = Vec::new();
        for (i, symbol) in ["btc", "eth", "sol", "xrp"].into_iter().enumerate() {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for ts in 0..25 {
                    store.save(Sample::new(symbol, ts, Price::from_cents(i as i64))).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for symbol in ["btc", "eth", "sol", "xrp"] {
            let latest = store.find_at_or_before(symbol, i64::MAX).await.unwrap().unwrap();
            assert_eq!(latest.timestamp, 24);
        }
    }
}
