//! Quote provider abstraction and implementation.
//!
//! This module contains:
//! - The `QuoteProvider` trait the primary quote source implements
//! - `ProviderAdapter`, the boundary that turns provider outcomes into
//!   `QuoteResult`s and never fails
//! - The Finnhub implementation
//!
//! Providers receive canonical [`Symbol`](crate::Symbol)s and make exactly
//! one outbound call per request. Spacing, quota and caching are the
//! caller's concern.

mod adapter;
mod traits;

pub mod finnhub;

// Re-exports
pub use adapter::ProviderAdapter;
pub use traits::QuoteProvider;
