use std::sync::Arc;
use std::time::Duration;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};
use crate::collector::poller::{Poller, MAX_PERIOD};
use crate::config::CollectorConfig;
use crate::error::{Error, Result};
use crate::interfaces::{PriceSource, SampleStore};

/// Owns the symbol → poller mapping and is the only place pollers are created.
///
/// Lookup and create-or-skip happen under the map's shard lock for that key,
/// so concurrent `add` calls for the same symbol start at most one poller.
/// A removed symbol keeps its (stopped) entry; the next `add` replaces it with
/// a fresh poller without waiting for the old loop to exit. If the old loop is
/// mid-tick at that moment it may still complete one fetch and save, so two
/// loops can briefly overlap for a symbol during replacement.
pub struct Registry {
    pollers: DashMap<String, Arc<Poller>>,
    store: Arc<dyn SampleStore>,
    source: Arc<dyn PriceSource>,
    default_period: Duration,
    fetch_timeout: Duration,
}

impl Registry {
    pub fn new(
        store: Arc<dyn SampleStore>,
        source: Arc<dyn PriceSource>,
        config: &CollectorConfig,
    ) -> Self {
        Self::with_timing(store, source, config.default_period(), config.fetch_timeout())
    }

    /// Like `new`, with explicit durations. A zero default period is raised to
    /// one second so no poller is ever built with an empty interval, and one
    /// above [`MAX_PERIOD`] is lowered to it.
    pub fn with_timing(
        store: Arc<dyn SampleStore>,
        source: Arc<dyn PriceSource>,
        default_period: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        let default_period = if default_period.is_zero() {
            Duration::from_secs(1)
        } else {
            default_period.min(MAX_PERIOD)
        };
        Registry {
            pollers: DashMap::new(),
            store,
            source,
            default_period,
            fetch_timeout,
        }
    }

    pub fn default_period(&self) -> Duration {
        self.default_period
    }

    /// Starts polling `symbol` every `period_secs` seconds, or at the default
    /// period when `period_secs <= 0`. Periods longer than [`MAX_PERIOD`] are
    /// rejected. No-op if the symbol is already polled; the running poller
    /// keeps its original interval.
    pub fn add(&self, symbol: &str, period_secs: i64) -> Result<()> {
        if symbol.trim().is_empty() {
            return Err(Error::EmptySymbol);
        }
        let period = if period_secs <= 0 {
            self.default_period
        } else {
            let period = Duration::from_secs(period_secs as u64);
            if period > MAX_PERIOD {
                return Err(Error::InvalidPeriod(period_secs));
            }
            period
        };

        match self.pollers.entry(symbol.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_active() {
                    debug!(symbol, "already polling");
                    return Ok(());
                }
                entry.insert(self.start_poller(symbol, period));
            }
            Entry::Vacant(entry) => {
                entry.insert(self.start_poller(symbol, period));
            }
        }

        info!(symbol, period_secs = period.as_secs(), "currency added");
        Ok(())
    }

    /// Signals the poller for `symbol` to stop. Unknown symbols are a no-op.
    pub fn remove(&self, symbol: &str) -> Result<()> {
        match self.pollers.get(symbol) {
            Some(poller) => {
                poller.stop();
                info!(symbol, "currency removed");
            }
            None => debug!(symbol, "remove ignored, symbol not tracked"),
        }
        Ok(())
    }

    pub fn is_running(&self, symbol: &str) -> bool {
        self.pollers.get(symbol).map(|p| p.running()).unwrap_or(false)
    }

    pub fn poller(&self, symbol: &str) -> Option<Arc<Poller>> {
        self.pollers.get(symbol).map(|p| Arc::clone(p.value()))
    }

    /// Symbols with a poller that is running and not asked to stop, sorted.
    pub fn tracked_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.pollers
            .iter()
            .filter(|entry| entry.value().is_active())
            .map(|entry| entry.key().clone())
            .collect();
        symbols.sort();
        symbols
    }

    /// Stops every poller. Entries stay in the map.
    pub fn shutdown(&self) {
        let mut stopped = 0;
        for entry in self.pollers.iter() {
            if entry.value().is_active() {
                entry.value().stop();
                stopped += 1;
            }
        }
        info!(stopped, "registry shut down");
    }

    fn start_poller(&self, symbol: &str, period: Duration) -> Arc<Poller> {
        let poller = Arc::new(Poller::new(
            symbol,
            period,
            self.fetch_timeout,
            Arc::clone(&self.store),
            Arc::clone(&self.source),
        ));
        poller.start();
        poller
    }
}
