use std::sync::Arc;
use anyhow::Context;
use crypto_observer::api::{create_router, ApiState};
use crypto_observer::config::AppConfig;
use crypto_observer::core::CurrencyService;
use crypto_observer::observability::{metrics, tracing::init_tracing};
use crypto_observer::price_infra::CoingeckoConnector;
use crypto_observer::storage::open_store;
use crypto_observer::utils::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("OBSERVER_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.log).context("initialising tracing")?;
    metrics::register_metrics().context("registering metrics")?;

    let store = open_store(&config.storage).context("opening sample store")?;
    let source = Arc::new(CoingeckoConnector::new(&config.coingecko).context("building price source")?);
    let service = Arc::new(CurrencyService::new(store, source, &config.collector));

    let app = create_router(Arc::new(ApiState { service: Arc::clone(&service) }));
    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("binding {}", config.server.addr))?;
    tracing::info!(addr = %config.server.addr, env = %env, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    service.shutdown();
    tracing::info!("shutdown complete");
    Ok(())
}
