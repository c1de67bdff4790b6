//! Infallible boundary around a [`QuoteProvider`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{QuoteResult, Symbol};
use crate::provider::QuoteProvider;

/// Turns provider calls into [`QuoteResult`]s.
///
/// Never returns an error: malformed symbols are rejected without a network
/// call, and transport or data failures become `success: false` results.
/// Prices are normalized to two decimal places.
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: Arc<dyn QuoteProvider>,
}

impl ProviderAdapter {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self { provider }
    }

    /// Identifier of the wrapped provider.
    pub fn source(&self) -> &'static str {
        self.provider.id()
    }

    /// Fetch one symbol.
    pub async fn fetch(&self, raw_symbol: &str) -> QuoteResult {
        let symbol = match Symbol::parse(raw_symbol) {
            Ok(symbol) => symbol,
            Err(e) => {
                debug!("Rejecting '{}' before request: {}", raw_symbol, e);
                return QuoteResult::failure(&e, self.source());
            }
        };

        let outcome = self.provider.get_latest_quote(&symbol).await;
        if let Err(e) = &outcome {
            warn!(
                "{} failed for {} ({:?}): {}",
                self.source(),
                symbol,
                e.kind(),
                e
            );
        }
        QuoteResult::from_outcome(outcome, self.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, MarketDataError};
    use crate::test_support::ScriptedProvider;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_invalid_symbol_makes_no_call() {
        let provider = Arc::new(ScriptedProvider::new());
        let adapter = ProviderAdapter::new(provider.clone());

        let result = adapter.fetch("NOT A SYMBOL").await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_success_is_normalized() {
        let provider = Arc::new(ScriptedProvider::new().with_price("AAPL", dec!(189.987)));
        let adapter = ProviderAdapter::new(provider.clone());

        let result = adapter.fetch("aapl").await;
        assert!(result.success);
        assert_eq!(result.price, Some(dec!(189.99)));
        assert_eq!(result.source, "SCRIPTED");
        assert_eq!(provider.calls(), vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn test_errors_become_failed_results() {
        let provider = Arc::new(ScriptedProvider::new().with_error(
            "MSFT",
            MarketDataError::ProviderError {
                provider: "SCRIPTED".to_string(),
                message: "HTTP 502 Bad Gateway".to_string(),
            },
        ));
        let adapter = ProviderAdapter::new(provider);

        let result = adapter.fetch("MSFT").await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Transport));
        assert!(result.error.unwrap().contains("HTTP 502"));

        let unknown = adapter.fetch("ZZZZ").await;
        assert_eq!(unknown.error_kind, Some(ErrorKind::Data));
    }
}
