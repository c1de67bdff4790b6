//! Pricewatch Market Data Crate
//!
//! This crate turns an arbitrary stream of "get me the price of X" requests
//! into a bounded, polite stream of outbound calls to a quote provider.
//!
//! # Overview
//!
//! The market data crate provides:
//! - A short-lived quote cache with TTL and insertion-order eviction
//! - A persisted daily request quota with calendar-day rollover
//! - A FIFO request queue that dispatches one call at a time, spaced out
//! - A Finnhub provider behind an infallible adapter
//! - Single and batch fetch entry points that never return errors
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   QuoteClient    |  fetch_price / batch_fetch
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   QuoteCache     | --> |  QuotaTracker    | --> KeyValueStore (port)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  RequestQueue    |  (FIFO, min spacing)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ProviderAdapter  |  (Finnhub)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteClient`] - Public entry point, explicitly constructed
//! - [`QuoteClientConfig`] - Cache TTL, cache size, daily limit, spacing
//! - [`QuoteResult`] - Success flag plus price data or error
//! - [`Symbol`] - Canonical, validated ticker symbol
//! - [`KeyValueStore`] - Persistence port for the quota counter

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod queue;
pub mod quota;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all public types from models
pub use models::{
    normalize_price, BatchProgress, BatchQuote, ProviderQuote, QuoteResult, Symbol,
};

pub use client::{CollectingProgress, NoProgress, ProgressSink, QuoteClient};
pub use config::QuoteClientConfig;
pub use errors::{ErrorKind, MarketDataError};

// Re-export provider types
pub use provider::finnhub::FinnhubProvider;
pub use provider::{ProviderAdapter, QuoteProvider};

pub use cache::QuoteCache;
pub use queue::{Dispatch, Dispatched, QueueState, RequestQueue};
pub use quota::{
    LocalQuotaClock, PendingQuotaWrite, QuotaClock, QuotaState, QuotaStatus, QuotaTracker,
};
pub use store::{InMemoryKeyValueStore, KeyValueStore};
