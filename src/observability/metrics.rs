use lazy_static::lazy_static;
use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use crate::error::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Poller metrics
    pub static ref FETCH_ATTEMPTS: IntCounterVec = IntCounterVec::new(
        Opts::new("price_fetch_attempts_total", "Price fetches issued by pollers"),
        &["symbol"]
    ).unwrap();

    pub static ref FETCH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("price_fetch_failures_total", "Price fetches that failed or timed out"),
        &["symbol"]
    ).unwrap();

    pub static ref SAMPLES_SAVED: IntCounterVec = IntCounterVec::new(
        Opts::new("samples_saved_total", "Samples persisted to the store"),
        &["symbol"]
    ).unwrap();

    pub static ref SAVE_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("sample_save_failures_total", "Samples lost to store write errors"),
        &["symbol"]
    ).unwrap();

    pub static ref ACTIVE_POLLERS: IntGauge = IntGauge::new(
        "active_pollers",
        "Poller loops currently running"
    ).unwrap();

    // Query metrics
    pub static ref PRICE_LOOKUPS: IntCounter = IntCounter::new(
        "price_lookups_total",
        "Closest-price lookups served"
    ).unwrap();

    pub static ref PRICE_LOOKUPS_NOT_FOUND: IntCounter = IntCounter::new(
        "price_lookups_not_found_total",
        "Closest-price lookups with no sample at or before the timestamp"
    ).unwrap();
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(FETCH_ATTEMPTS.clone()))?;
    REGISTRY.register(Box::new(FETCH_FAILURES.clone()))?;
    REGISTRY.register(Box::new(SAMPLES_SAVED.clone()))?;
    REGISTRY.register(Box::new(SAVE_FAILURES.clone()))?;
    REGISTRY.register(Box::new(ACTIVE_POLLERS.clone()))?;
    REGISTRY.register(Box::new(PRICE_LOOKUPS.clone()))?;
    REGISTRY.register(Box::new(PRICE_LOOKUPS_NOT_FOUND.clone()))?;
    Ok(())
}

/// Renders the registry in the Prometheus text exposition format.
pub fn gather_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::MetricsError(prometheus::Error::Msg(e.to_string())))
}
