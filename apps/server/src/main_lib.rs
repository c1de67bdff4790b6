use std::sync::Arc;

use crate::{config::Config, events::EventBus};
use anyhow::Context;
use pricewatch_core::watchlist::{WatchlistService, WatchlistServiceTrait};
use pricewatch_market_data::{
    provider::finnhub::BASE_URL as FINNHUB_BASE_URL, FinnhubProvider, KeyValueStore, QuoteClient,
    QuoteProvider,
};
use pricewatch_storage_sqlite::{
    db::{self, write_actor},
    settings::SqliteKeyValueStore,
    watchlist::WatchlistRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub quote_client: Arc<QuoteClient>,
    pub watchlist_service: Arc<dyn WatchlistServiceTrait + Send + Sync>,
    pub event_bus: EventBus,
}

pub fn init_tracing() {
    let log_format = std::env::var("PW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Build the application state against the live Finnhub API.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let api_key = config
        .finnhub_api_key
        .clone()
        .context("PW_FINNHUB_API_KEY (or FINNHUB_API_KEY) must be set")?;
    let base_url = config
        .finnhub_base_url
        .clone()
        .unwrap_or_else(|| FINNHUB_BASE_URL.to_string());
    let provider = Arc::new(FinnhubProvider::with_options(
        api_key,
        base_url,
        config.request_timeout,
    ));
    build_state_with_provider(config, provider).await
}

/// Build the application state around any quote provider.
pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn QuoteProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer(pool.clone());

    let quota_store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool.clone()));
    let quote_client = Arc::new(QuoteClient::new(
        config.quote_client.clone(),
        provider,
        quota_store,
    ));

    let watchlist_repository = Arc::new(WatchlistRepository::new(pool.clone(), writer.clone()));
    let watchlist_service: Arc<dyn WatchlistServiceTrait + Send + Sync> =
        Arc::new(WatchlistService::new(watchlist_repository));

    let event_bus = EventBus::new(256);

    Ok(Arc::new(AppState {
        quote_client,
        watchlist_service,
        event_bus,
    }))
}
