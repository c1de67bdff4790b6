//! Finnhub quote provider implementation.
//!
//! Fetches the latest price from the `/quote` endpoint. The access token is
//! sent as the `token` query parameter alongside `symbol`.
//!
//! Finnhub answers unknown symbols with HTTP 200 and zeroed (or null)
//! fields, so the body is classified into a quote or a data error before
//! anything else sees it.
//!
//! API documentation: https://finnhub.io/docs/api/quote

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{ProviderQuote, Symbol, DEFAULT_CURRENCY};
use crate::provider::QuoteProvider;

pub const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Change
    d: Option<f64>,
    /// Percent change
    dp: Option<f64>,
    /// High price of the day
    h: Option<f64>,
    /// Low price of the day
    l: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// Previous close price
    pc: Option<f64>,
    /// Timestamp (Unix)
    t: Option<i64>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// Convert an optional float, dropping non-finite values.
fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value
        .filter(|v| v.is_finite())
        .and_then(|v| Decimal::try_from(v).ok())
}

/// Same as [`to_decimal`], but zero means "not reported".
fn to_positive_decimal(value: Option<f64>) -> Option<Decimal> {
    to_decimal(value).filter(|v| v.is_sign_positive() && !v.is_zero())
}

impl QuoteResponse {
    /// Classify the body: a positive current price is a quote, anything
    /// else means the provider has no data for the symbol.
    pub(crate) fn into_quote(self, symbol: &Symbol) -> Result<ProviderQuote, MarketDataError> {
        let price = to_positive_decimal(self.c).ok_or_else(|| {
            MarketDataError::NoData(format!("no usable price for {}", symbol))
        })?;

        let previous_close = to_positive_decimal(self.pc);
        let change = to_decimal(self.d).or_else(|| previous_close.map(|pc| price - pc));
        let change_percent = to_decimal(self.dp).or_else(|| match (change, previous_close) {
            (Some(change), Some(pc)) => Some(change / pc * Decimal::ONE_HUNDRED),
            _ => None,
        });

        let timestamp = self
            .t
            .filter(|ts| *ts > 0)
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(ProviderQuote {
            price,
            change,
            change_percent,
            high: to_positive_decimal(self.h),
            low: to_positive_decimal(self.l),
            open: to_positive_decimal(self.o),
            previous_close,
            currency: DEFAULT_CURRENCY.to_string(),
            timestamp,
        })
    }
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub quote provider.
///
/// Free tier is limited to 60 API calls per minute.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_options(api_key, BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a provider against a custom endpoint and HTTP timeout.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: format!("Request failed: {}", e.without_url()),
                    }
                }
            })?;

        let status = response.status();

        // 403 is what Finnhub returns once the plan's quota is spent
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(ErrorResponse {
                error: Some(error_msg),
            }) = serde_json::from_str::<ErrorResponse>(&body)
            {
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("HTTP {} - {}", status, error_msg),
                });
            }

            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e.without_url()),
            })
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<ProviderQuote, MarketDataError> {
        let text = self.fetch("/quote", &[("symbol", symbol.as_str())]).await?;

        let response: QuoteResponse =
            serde_json::from_str(&text).map_err(|e| MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote response: {}", e),
            })?;

        response.into_quote(symbol)
    }
}
