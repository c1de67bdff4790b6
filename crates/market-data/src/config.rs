//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default cache time-to-live: 5 minutes.
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

/// Default eviction ceiling for the quote cache.
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 100;

/// Default daily request budget.
pub const DEFAULT_DAILY_REQUEST_LIMIT: u32 = 500;

/// Default spacing between outbound calls (Finnhub free tier: 60/minute).
pub const DEFAULT_MIN_DISPATCH_INTERVAL_MS: u64 = 1000;

/// Tunables for [`QuoteClient`](crate::QuoteClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteClientConfig {
    /// Cached entries older than this are treated as absent.
    pub cache_ttl_ms: u64,
    /// Cache eviction ceiling.
    pub max_cache_entries: usize,
    /// Quota ceiling per calendar day.
    pub daily_request_limit: u32,
    /// Minimum spacing between consecutive outbound calls.
    pub min_dispatch_interval_ms: u64,
}

impl QuoteClientConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn min_dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.min_dispatch_interval_ms)
    }
}

impl Default for QuoteClientConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            max_cache_entries: DEFAULT_MAX_CACHE_ENTRIES,
            daily_request_limit: DEFAULT_DAILY_REQUEST_LIMIT,
            min_dispatch_interval_ms: DEFAULT_MIN_DISPATCH_INTERVAL_MS,
        }
    }
}
