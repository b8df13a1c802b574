pub mod memory;
pub mod sqlite;

use std::sync::Arc;
use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::interfaces::SampleStore;

pub use memory::InMemorySampleStore;
pub use sqlite::SqliteSampleStore;

/// Builds the configured sample store.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn SampleStore>> {
    let store: Arc<dyn SampleStore> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteSampleStore::open(&config.path)?),
        StorageBackend::Memory => {
            tracing::warn!("using in-memory sample store, samples are lost on exit");
            Arc::new(InMemorySampleStore::new())
        }
    };
    Ok(store)
}
