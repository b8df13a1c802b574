use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use dashmap::DashMap;
use crate::error::Result;
use crate::interfaces::SampleStore;
use crate::types::{Price, Sample};

/// Process-local sample store.
///
/// Samples are keyed by `(timestamp, insertion sequence)` per symbol, so a
/// range scan up to `(ts, u64::MAX)` yields the latest sample at or before `ts`
/// and breaks timestamp ties in favour of the most recent insert.
#[derive(Default)]
pub struct InMemorySampleStore {
    samples: DashMap<String, BTreeMap<(i64, u64), Price>>,
    seq: AtomicU64,
}

impl InMemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples stored for `symbol`.
    pub fn count(&self, symbol: &str) -> usize {
        self.samples.get(symbol).map(|s| s.len()).unwrap_or(0)
    }

    /// All samples for `symbol` in timestamp order.
    pub fn samples_for(&self, symbol: &str) -> Vec<Sample> {
        self.samples
            .get(symbol)
            .map(|series| {
                series.iter()
                    .map(|(&(ts, _), &price)| Sample::new(symbol, ts, price))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl SampleStore for InMemorySampleStore {
    async fn save(&self, sample: Sample) -> Result<()> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.samples
            .entry(sample.symbol)
            .or_default()
            .insert((sample.timestamp, seq), sample.price);
        Ok(())
    }

    async fn find_at_or_before(&self, symbol: &str, ts: i64) -> Result<Option<Sample>> {
        let Some(series) = self.samples.get(symbol) else {
            return Ok(None);
        };
        Ok(series
            .range(..=(ts, u64::MAX))
            .next_back()
            .map(|(&(found_ts, _), &price)| Sample::new(symbol, found_ts, price)))
    }
}
