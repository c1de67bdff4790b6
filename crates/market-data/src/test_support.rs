//! Test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::time::Instant;

use crate::errors::MarketDataError;
use crate::models::{ProviderQuote, Symbol};
use crate::provider::QuoteProvider;
use crate::quota::QuotaClock;

enum Script {
    Price(Decimal),
    Fail(MarketDataError),
    Panic,
}

/// Provider answering from a script and recording every call.
///
/// Unscripted symbols answer with `NoData`.
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    latency: Duration,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: Mutex<usize>,
    max_in_flight: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: Mutex::new(0),
            max_in_flight: Mutex::new(0),
        }
    }

    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.scripts.insert(symbol.to_string(), Script::Price(price));
        self
    }

    pub fn with_error(mut self, symbol: &str, error: MarketDataError) -> Self {
        self.scripts.insert(symbol.to_string(), Script::Fail(error));
        self
    }

    pub fn with_panic(mut self, symbol: &str) -> Self {
        self.scripts.insert(symbol.to_string(), Script::Panic);
        self
    }

    /// Simulated network latency per call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    /// Highest number of concurrently running calls observed.
    pub fn max_in_flight(&self) -> usize {
        *self.max_in_flight.lock().unwrap()
    }
}

/// Rebuild a scripted error for each call.
fn replay(error: &MarketDataError) -> MarketDataError {
    match error {
        MarketDataError::InvalidSymbol(s) => MarketDataError::InvalidSymbol(s.clone()),
        MarketDataError::QuotaExceeded { used, limit } => MarketDataError::QuotaExceeded {
            used: *used,
            limit: *limit,
        },
        MarketDataError::QuotaSkipped => MarketDataError::QuotaSkipped,
        MarketDataError::RateLimited { provider } => MarketDataError::RateLimited {
            provider: provider.clone(),
        },
        MarketDataError::Timeout { provider } => MarketDataError::Timeout {
            provider: provider.clone(),
        },
        MarketDataError::NoData(s) => MarketDataError::NoData(s.clone()),
        MarketDataError::InvalidResponse { provider, message } => {
            MarketDataError::InvalidResponse {
                provider: provider.clone(),
                message: message.clone(),
            }
        }
        MarketDataError::Storage(s) => MarketDataError::Storage(s.clone()),
        MarketDataError::Dropped(s) => MarketDataError::Dropped(s.clone()),
        other => MarketDataError::ProviderError {
            provider: "SCRIPTED".to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        "SCRIPTED"
    }

    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<ProviderQuote, MarketDataError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), Instant::now()));
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock().unwrap();
            *max = (*max).max(*in_flight);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        *self.in_flight.lock().unwrap() -= 1;

        match self.scripts.get(symbol.as_str()) {
            Some(Script::Price(price)) => Ok(ProviderQuote::new(*price, "USD", Utc::now())),
            Some(Script::Fail(error)) => Err(replay(error)),
            Some(Script::Panic) => panic!("scripted provider panic for {}", symbol),
            None => Err(MarketDataError::NoData(format!("no usable price for {}", symbol))),
        }
    }
}

/// Quota clock whose date is set by the test.
pub struct FixedClock(Mutex<NaiveDate>);

impl FixedClock {
    pub fn new(date: NaiveDate) -> Arc<Self> {
        Arc::new(Self(Mutex::new(date)))
    }

    pub fn set(&self, date: NaiveDate) {
        *self.0.lock().unwrap() = date;
    }
}

impl QuotaClock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}
