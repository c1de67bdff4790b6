use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use pricewatch_market_data::{BatchQuote, NoProgress, QuotaStatus, QuoteResult};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    symbols: Vec<String>,
}

/// Always 200; a failed lookup is reported in the body.
async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<QuoteResult> {
    Json(state.quote_client.fetch_price(&symbol).await)
}

async fn batch_quotes(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchRequest>,
) -> Json<Vec<BatchQuote>> {
    Json(
        state
            .quote_client
            .batch_fetch(&body.symbols, &NoProgress)
            .await,
    )
}

async fn get_quota(State(state): State<Arc<AppState>>) -> Json<QuotaStatus> {
    Json(state.quote_client.quota_status())
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.quote_client.clear_cache();
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes/batch", post(batch_quotes))
        .route("/quotes/cache", delete(clear_cache))
        .route("/quotes/{symbol}", get(get_quote))
        .route("/quota", get(get_quota))
}
