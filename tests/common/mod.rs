#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use crypto_observer::error::{Error, Result};
use crypto_observer::interfaces::{PriceSource, SampleStore};
use crypto_observer::storage::InMemorySampleStore;
use crypto_observer::types::{Price, Sample};

/// Returns a fixed price, optionally failing the first `fail_first` calls.
pub struct ScriptedSource {
    price: Price,
    fail_first: usize,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn fixed(cents: i64) -> Arc<Self> {
        Self::failing_then(0, cents)
    }

    pub fn failing_then(fail_first: usize, cents: i64) -> Arc<Self> {
        Arc::new(ScriptedSource {
            price: Price::from_cents(cents),
            fail_first,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch(&self, _id: &str) -> Result<Price> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(Error::PriceSource("upstream unavailable".to_string()));
        }
        Ok(self.price)
    }
}

/// In-memory store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemorySampleStore,
    fail_writes: AtomicBool,
    write_attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    pub fn count(&self, symbol: &str) -> usize {
        self.inner.count(symbol)
    }

    pub fn samples_for(&self, symbol: &str) -> Vec<Sample> {
        self.inner.samples_for(symbol)
    }
}

#[async_trait]
impl SampleStore for FlakyStore {
    async fn save(&self, sample: Sample) -> Result<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::StorageError("write rejected".to_string()));
        }
        self.inner.save(sample).await
    }

    async fn find_at_or_before(&self, symbol: &str, ts: i64) -> Result<Option<Sample>> {
        self.inner.find_at_or_before(symbol, ts).await
    }
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
