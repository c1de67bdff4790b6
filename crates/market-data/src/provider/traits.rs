//! Quote provider trait definition.
//!
//! This module defines the `QuoteProvider` trait that the primary quote
//! source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ProviderQuote, Symbol};

/// Trait for quote providers.
///
/// Implementations perform exactly one outbound request per call and
/// classify the response up front: a usable price becomes a
/// [`ProviderQuote`], anything else a [`MarketDataError`]. Rate limiting,
/// quota accounting and caching happen outside the provider.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pricewatch_market_data::provider::QuoteProvider;
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_latest_quote(&self, symbol: &Symbol) -> Result<ProviderQuote, MarketDataError> {
///         // ... one HTTP call
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used as the `source` of every result and in logs.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The canonical, already-validated symbol
    ///
    /// # Returns
    ///
    /// The latest quote on success, or a transport/data `MarketDataError`.
    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<ProviderQuote, MarketDataError>;
}
