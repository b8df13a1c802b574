use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, Instrument};
use crate::error::Error;
use crate::interfaces::{PriceSource, SampleStore};
use crate::observability::metrics::{
    ACTIVE_POLLERS, FETCH_ATTEMPTS, FETCH_FAILURES, SAMPLES_SAVED, SAVE_FAILURES,
};
use crate::observability::tracing::poller_span;
use crate::types::Sample;
use crate::types::timestamp::now_unix_secs;

/// Longest accepted interval between samples.
pub const MAX_PERIOD: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Periodic fetch-then-persist loop for a single symbol.
///
/// `start` and `stop` are idempotent and never block. The loop runs as its own
/// tokio task until it observes the stop signal; `running` stays true until
/// then. Dropping the poller also ends its loop at the next suspension point.
pub struct Poller {
    symbol: String,
    source_id: String,
    period: Duration,
    fetch_timeout: Duration,
    store: Arc<dyn SampleStore>,
    source: Arc<dyn PriceSource>,
    running: Arc<AtomicBool>,
    // Some(..) exactly while a loop is running and has not been asked to stop.
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl Poller {
    /// `period` must be non-zero; the registry substitutes its default first.
    /// Periods above [`MAX_PERIOD`] are clamped to it.
    pub fn new(
        symbol: impl Into<String>,
        period: Duration,
        fetch_timeout: Duration,
        store: Arc<dyn SampleStore>,
        source: Arc<dyn PriceSource>,
    ) -> Self {
        debug_assert!(!period.is_zero(), "poller period must be positive");
        let period = period.min(MAX_PERIOD);
        let symbol = symbol.into();
        let source_id = source.resolve_id(&symbol);
        Poller {
            symbol,
            source_id,
            period,
            fetch_timeout,
            store,
            source,
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: Mutex::new(None),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Launches the loop unless one is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut stop_slot = self.stop_slot();
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        *stop_slot = Some(stop_tx);

        let poll_loop = PollLoop {
            symbol: self.symbol.clone(),
            source_id: self.source_id.clone(),
            period: self.period,
            fetch_timeout: self.fetch_timeout,
            store: Arc::clone(&self.store),
            source: Arc::clone(&self.source),
        };
        let guard = RunningGuard::engage(Arc::clone(&self.running));
        tokio::spawn(
            poll_loop.run(stop_rx, guard).instrument(poller_span(&self.symbol)),
        );

        info!(
            symbol = %self.symbol,
            source_id = %self.source_id,
            period_ms = self.period.as_millis() as u64,
            "poller started"
        );
    }

    /// Asks the loop to exit at its next suspension point. Returns immediately.
    pub fn stop(&self) {
        let mut stop_slot = self.stop_slot();
        if !self.running() {
            return;
        }
        if let Some(stop_tx) = stop_slot.take() {
            // The loop may already be gone if it panicked; nothing to signal then.
            let _ = stop_tx.send(());
            info!(symbol = %self.symbol, "poller stop requested");
        }
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Running and not yet asked to stop.
    pub fn is_active(&self) -> bool {
        let stop_slot = self.stop_slot();
        self.running() && stop_slot.is_some()
    }

    fn stop_slot(&self) -> MutexGuard<'_, Option<oneshot::Sender<()>>> {
        self.stop_tx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_slot().take() {
            let _ = stop_tx.send(());
        }
    }
}

/// Clears the running flag when the loop task ends, including by panic.
struct RunningGuard {
    running: Arc<AtomicBool>,
}

impl RunningGuard {
    fn engage(running: Arc<AtomicBool>) -> Self {
        ACTIVE_POLLERS.inc();
        RunningGuard { running }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        ACTIVE_POLLERS.dec();
    }
}

struct PollLoop {
    symbol: String,
    source_id: String,
    period: Duration,
    fetch_timeout: Duration,
    store: Arc<dyn SampleStore>,
    source: Arc<dyn PriceSource>,
}

impl PollLoop {
    async fn run(self, mut stop_rx: oneshot::Receiver<()>, _guard: RunningGuard) {
        // First tick one full period after start; late ticks shift, never burst.
        let Some(first_tick) = Instant::now().checked_add(self.period) else {
            error!(period_secs = self.period.as_secs(), "poll period overflows the clock");
            return;
        };
        let mut ticker = interval_at(first_tick, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failure_streak: u32 = 0;

        loop {
            tokio::select! {
                biased;
                // Also resolves when the sender is dropped with the poller.
                _ = &mut stop_rx => break,
                _ = ticker.tick() => self.poll_once(&mut failure_streak).await,
            }
        }

        info!("poller stopped");
    }

    async fn poll_once(&self, failure_streak: &mut u32) {
        FETCH_ATTEMPTS.with_label_values(&[self.symbol.as_str()]).inc();

        let fetched = timeout(self.fetch_timeout, self.source.fetch(&self.source_id))
            .await
            .unwrap_or_else(|_| Err(Error::FetchTimeout(self.fetch_timeout)));

        let price = match fetched {
            Ok(price) => {
                if *failure_streak > 0 {
                    info!(failed_ticks = *failure_streak, "price fetch recovered");
                }
                *failure_streak = 0;
                price
            }
            Err(e) => {
                *failure_streak += 1;
                FETCH_FAILURES.with_label_values(&[self.symbol.as_str()]).inc();
                error!(
                    source_id = %self.source_id,
                    failure_streak = *failure_streak,
                    error = %e,
                    "price fetch failed"
                );
                return;
            }
        };

        let sample = Sample::new(self.symbol.clone(), now_unix_secs(), price);
        let ts = sample.timestamp;
        match self.store.save(sample).await {
            Ok(()) => {
                SAMPLES_SAVED.with_label_values(&[self.symbol.as_str()]).inc();
                debug!(ts, price = %price, "sample saved");
            }
            Err(e) => {
                SAVE_FAILURES.with_label_values(&[self.symbol.as_str()]).inc();
                error!(ts, price = %price, error = %e, "sample save failed, dropping tick");
            }
        }
    }
}
