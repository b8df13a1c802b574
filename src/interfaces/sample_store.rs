use async_trait::async_trait;
use crate::error::Result;
use crate::types::Sample;

/// Append-only sample storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SampleStore: Send + Sync {
    async fn save(&self, sample: Sample) -> Result<()>;

    /// Latest sample for `symbol` with `timestamp <= ts`. When several samples
    /// share that timestamp, the most recently saved one is returned.
    async fn find_at_or_before(&self, symbol: &str, ts: i64) -> Result<Option<Sample>>;
}
