use std::sync::Arc;

use crate::{
    error::ApiResult,
    events::{ServerEvent, QUOTES_REFRESH_COMPLETE},
    main_lib::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use pricewatch_core::watchlist::{
    NewWatchedInstrument, WatchedInstrument, WatchedInstrumentUpdate,
};
use pricewatch_market_data::BatchQuote;
use serde_json::json;

async fn get_watchlist(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<WatchedInstrument>>> {
    let instruments = state.watchlist_service.get_watchlist()?;
    Ok(Json(instruments))
}

async fn add_instrument(
    State(state): State<Arc<AppState>>,
    Json(instrument): Json<NewWatchedInstrument>,
) -> ApiResult<Json<WatchedInstrument>> {
    let added = state.watchlist_service.add_instrument(instrument).await?;
    Ok(Json(added))
}

async fn update_instrument(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<WatchedInstrumentUpdate>,
) -> ApiResult<Json<WatchedInstrument>> {
    let updated = state
        .watchlist_service
        .update_instrument(&symbol, update)
        .await?;
    Ok(Json(updated))
}

async fn remove_instrument(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.watchlist_service.remove_instrument(&symbol).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch every watched symbol, streaming progress over the event bus.
async fn refresh_watchlist(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BatchQuote>>> {
    let symbols = state.watchlist_service.get_symbols()?;
    tracing::info!("Refreshing {} watched symbols", symbols.len());

    let results = state
        .quote_client
        .batch_fetch(&symbols, &state.event_bus)
        .await;

    let succeeded = results.iter().filter(|q| q.result.success).count();
    state.event_bus.publish(ServerEvent::with_payload(
        QUOTES_REFRESH_COMPLETE,
        json!({
            "total": results.len(),
            "succeeded": succeeded,
            "failed": results.len() - succeeded,
        }),
    ));

    Ok(Json(results))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/watchlist", get(get_watchlist).post(add_instrument))
        .route("/watchlist/refresh", post(refresh_watchlist))
        .route(
            "/watchlist/{symbol}",
            put(update_instrument).delete(remove_instrument),
        )
}
