//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`ErrorKind`]: The failure category surfaced to callers on failed results

mod kind;

pub use kind::ErrorKind;

use thiserror::Error;

/// Message attached to batch entries that were never attempted.
pub const SKIPPED_DUE_TO_QUOTA: &str = "skipped due to daily quota limit";

/// Errors that can occur during market data operations.
///
/// None of these escape the public fetch operations as `Err`; they are
/// converted into failed [`QuoteResult`](crate::QuoteResult)s via
/// [`QuoteResult::failure`](crate::QuoteResult::failure).
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The symbol is not 1-10 alphanumeric characters.
    #[error("Invalid symbol: '{0}' (expected 1-10 alphanumeric characters)")]
    InvalidSymbol(String),

    /// The daily request budget is exhausted.
    #[error("Daily quota exceeded: {used}/{limit} requests used today")]
    QuotaExceeded {
        /// Requests already made today
        used: u32,
        /// Configured daily ceiling
        limit: u32,
    },

    /// A batch entry that was not attempted because the budget could not cover it.
    #[error("{}", SKIPPED_DUE_TO_QUOTA)]
    QuotaSkipped,

    /// The provider rate limited the request (HTTP 429 / 403).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with a non-success status or the request failed.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered but had no usable price for the symbol.
    #[error("No price data: {0}")]
    NoData(String),

    /// The provider answered with a body that could not be interpreted.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The provider that sent the body
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The key-value persistence backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The queued request was lost before a result was produced.
    #[error("Request dropped: {0}")]
    Dropped(String),
}

impl MarketDataError {
    /// Returns the failure category for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricewatch_market_data::errors::{ErrorKind, MarketDataError};
    ///
    /// let error = MarketDataError::QuotaExceeded { used: 500, limit: 500 };
    /// assert_eq!(error.kind(), ErrorKind::QuotaExceeded);
    ///
    /// let error = MarketDataError::NoData("ZZZZ".to_string());
    /// assert_eq!(error.kind(), ErrorKind::Data);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSymbol(_) => ErrorKind::Validation,

            Self::QuotaExceeded { .. } | Self::QuotaSkipped => ErrorKind::QuotaExceeded,

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::ProviderError { .. } => ErrorKind::Transport,

            Self::NoData(_) | Self::InvalidResponse { .. } => ErrorKind::Data,

            Self::Storage(_) => ErrorKind::Storage,

            Self::Dropped(_) => ErrorKind::Internal,
        }
    }
}
