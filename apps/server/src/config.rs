use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use pricewatch_market_data::QuoteClientConfig;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: Option<String>,
    /// HTTP timeout of the provider client
    pub request_timeout: Duration,
    pub quote_client: QuoteClientConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("PW_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid PW_LISTEN_ADDR")?;
        let db_path = std::env::var("PW_DB_PATH").unwrap_or_else(|_| "./db/pricewatch.db".into());
        let cors_allow = std::env::var("PW_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let finnhub_api_key = std::env::var("PW_FINNHUB_API_KEY")
            .or_else(|_| std::env::var("FINNHUB_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        let finnhub_base_url = std::env::var("PW_FINNHUB_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());
        let timeout_ms: u64 = env_or("PW_REQUEST_TIMEOUT_MS", 30000);

        let defaults = QuoteClientConfig::default();
        let quote_client = QuoteClientConfig {
            cache_ttl_ms: env_or("PW_CACHE_TTL_MS", defaults.cache_ttl_ms),
            max_cache_entries: env_or("PW_MAX_CACHE_ENTRIES", defaults.max_cache_entries),
            daily_request_limit: env_or("PW_DAILY_REQUEST_LIMIT", defaults.daily_request_limit),
            min_dispatch_interval_ms: env_or(
                "PW_MIN_DISPATCH_INTERVAL_MS",
                defaults.min_dispatch_interval_ms,
            ),
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            finnhub_api_key,
            finnhub_base_url,
            request_timeout: Duration::from_millis(timeout_ms),
            quote_client,
        })
    }
}

/// Parse an env var, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_garbage() {
        std::env::set_var("PW_TEST_ENV_OR_GARBAGE", "not-a-number");
        assert_eq!(env_or::<u32>("PW_TEST_ENV_OR_GARBAGE", 500), 500);
        std::env::remove_var("PW_TEST_ENV_OR_GARBAGE");
    }

    #[test]
    fn env_or_reads_value() {
        std::env::set_var("PW_TEST_ENV_OR_VALUE", " 42 ");
        assert_eq!(env_or::<u64>("PW_TEST_ENV_OR_VALUE", 1), 42);
        std::env::remove_var("PW_TEST_ENV_OR_VALUE");
    }
}
