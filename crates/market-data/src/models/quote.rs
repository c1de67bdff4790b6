use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, MarketDataError};

/// Currency assumed when a provider does not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Decimal places prices and changes are normalized to.
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Round a value to [`PRICE_DECIMAL_PLACES`], half away from zero.
pub fn normalize_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Latest quote as reported by a provider, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderQuote {
    /// Current price (always positive)
    pub price: Decimal,

    /// Absolute change since the previous close
    pub change: Option<Decimal>,

    /// Percent change since the previous close
    pub change_percent: Option<Decimal>,

    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub open: Option<Decimal>,
    pub previous_close: Option<Decimal>,

    /// Quote currency
    pub currency: String,

    /// Timestamp of the quote
    pub timestamp: DateTime<Utc>,
}

impl ProviderQuote {
    /// Create a quote with only the required fields
    pub fn new(price: Decimal, currency: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            price,
            change: None,
            change_percent: None,
            high: None,
            low: None,
            open: None,
            previous_close: None,
            currency: currency.into(),
            timestamp,
        }
    }
}

/// Outcome of a single price fetch.
///
/// Callers branch on `success`; a failed result carries `error` and
/// `error_kind` and never a price. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Provider that produced (or would have produced) the quote
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl QuoteResult {
    /// Build a successful result, normalizing every price field.
    pub fn success(quote: ProviderQuote, source: impl Into<String>) -> Self {
        Self {
            success: true,
            price: Some(normalize_price(quote.price)),
            change: quote.change.map(normalize_price),
            change_percent: quote.change_percent.map(normalize_price),
            currency: Some(quote.currency),
            high: quote.high.map(normalize_price),
            low: quote.low.map(normalize_price),
            open: quote.open.map(normalize_price),
            previous_close: quote.previous_close.map(normalize_price),
            timestamp: Some(quote.timestamp),
            source: source.into(),
            error: None,
            error_kind: None,
        }
    }

    /// Build a failed result from an error.
    pub fn failure(error: &MarketDataError, source: impl Into<String>) -> Self {
        Self {
            success: false,
            price: None,
            change: None,
            change_percent: None,
            currency: None,
            high: None,
            low: None,
            open: None,
            previous_close: None,
            timestamp: None,
            source: source.into(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }

    /// Build a result from a provider outcome.
    pub fn from_outcome(
        outcome: Result<ProviderQuote, MarketDataError>,
        source: impl Into<String>,
    ) -> Self {
        match outcome {
            Ok(quote) => Self::success(quote, source),
            Err(e) => Self::failure(&e, source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_price_rounds_half_away_from_zero() {
        assert_eq!(normalize_price(dec!(150.255)), dec!(150.26));
        assert_eq!(normalize_price(dec!(150.245)), dec!(150.25));
        assert_eq!(normalize_price(dec!(-1.005)), dec!(-1.01));
        assert_eq!(normalize_price(dec!(42)), dec!(42));
    }

    #[test]
    fn test_success_normalizes_fields() {
        let mut quote = ProviderQuote::new(dec!(189.98765), "USD", Utc::now());
        quote.change = Some(dec!(1.23456));
        quote.change_percent = Some(dec!(0.65432));
        quote.previous_close = Some(dec!(188.75309));

        let result = QuoteResult::success(quote, "FINNHUB");
        assert!(result.success);
        assert_eq!(result.price, Some(dec!(189.99)));
        assert_eq!(result.change, Some(dec!(1.23)));
        assert_eq!(result.change_percent, Some(dec!(0.65)));
        assert_eq!(result.previous_close, Some(dec!(188.75)));
        assert_eq!(result.currency.as_deref(), Some("USD"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failure_carries_kind() {
        let result = QuoteResult::failure(
            &MarketDataError::QuotaExceeded {
                used: 5,
                limit: 5,
            },
            "FINNHUB",
        );
        assert!(!result.success);
        assert!(result.price.is_none());
        assert_eq!(result.error_kind, Some(ErrorKind::QuotaExceeded));
        assert!(result.error.unwrap().contains("quota"));
    }

    #[test]
    fn test_failure_serializes_without_price_fields() {
        let result = QuoteResult::failure(&MarketDataError::NoData("ZZZZ".into()), "FINNHUB");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorKind"], "data");
        assert!(json.get("price").is_none());
        assert!(json.get("changePercent").is_none());
    }
}
