//! Market data models
//!
//! This module contains the core data types for price fetching:
//! - `symbol` - Canonical, validated instrument symbol
//! - `quote` - Provider quotes and the caller-facing `QuoteResult`
//! - `batch` - Batch fetch entries and progress events

mod batch;
mod quote;
mod symbol;

pub use batch::{BatchProgress, BatchQuote};
pub use quote::{
    normalize_price, ProviderQuote, QuoteResult, DEFAULT_CURRENCY, PRICE_DECIMAL_PLACES,
};
pub use symbol::{Symbol, MAX_SYMBOL_LEN};
