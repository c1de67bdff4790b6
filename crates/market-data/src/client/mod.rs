//! Quota-aware, rate-limited, cached price fetching.
//!
//! [`QuoteClient`] is the public entry point. A request flows through:
//!
//! ```text
//! fetch_price(symbol)
//!     |-- invalid symbol ----------------------------> failed (validation)
//!     |-- cache hit ---------------------------------> cached result
//!     |-- quota spent -------------------------------> failed (quota)
//!     v
//! RequestQueue (FIFO, one dispatch at a time, spaced)
//!     |-- cache hit (filled while waiting) ----------> cached result
//!     |-- quota spent while waiting -----------------> failed (quota)
//!     v
//! record request -> ProviderAdapter -> cache successful result
//! ```
//!
//! Nothing here returns an error; every outcome is a [`QuoteResult`].

mod progress;

pub use progress::{CollectingProgress, NoProgress, ProgressSink};

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cache::QuoteCache;
use crate::config::QuoteClientConfig;
use crate::errors::MarketDataError;
use crate::models::{BatchProgress, BatchQuote, QuoteResult, Symbol};
use crate::provider::{ProviderAdapter, QuoteProvider};
use crate::queue::{Dispatch, Dispatched, QueueState, RequestQueue};
use crate::quota::{LocalQuotaClock, PendingQuotaWrite, QuotaClock, QuotaStatus, QuotaTracker};
use crate::store::KeyValueStore;

/// State shared between the client and its drain task.
struct ClientShared {
    cache: Mutex<QuoteCache>,
    quota: Mutex<QuotaTracker>,
    adapter: ProviderAdapter,
}

impl ClientShared {
    /// Lock the cache, recovering from poison if necessary.
    fn lock_cache(&self) -> MutexGuard<'_, QuoteCache> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("Quote cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Lock the quota tracker, recovering from poison if necessary.
    fn lock_quota(&self) -> MutexGuard<'_, QuotaTracker> {
        self.quota.lock().unwrap_or_else(|poisoned| {
            warn!("Quota tracker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn cached(&self, symbol: &Symbol) -> Option<QuoteResult> {
        self.lock_cache().get(symbol)
    }

    fn quota_error(quota: &mut QuotaTracker) -> MarketDataError {
        let status = quota.status();
        MarketDataError::QuotaExceeded {
            used: status.used,
            limit: status.limit,
        }
    }

    /// Check admission without consuming quota.
    fn check_admission(&self) -> Result<(), MarketDataError> {
        let mut quota = self.lock_quota();
        if quota.can_admit() {
            Ok(())
        } else {
            Err(Self::quota_error(&mut quota))
        }
    }

    /// Check admission and count the request in one step.
    ///
    /// The count is updated under the lock; the returned write must be
    /// handed to [`persist_quota`](Self::persist_quota). A day rollover
    /// inside `can_admit` still writes while locked, once per day.
    fn admit(&self) -> Result<Option<PendingQuotaWrite>, MarketDataError> {
        let mut quota = self.lock_quota();
        if !quota.can_admit() {
            return Err(Self::quota_error(&mut quota));
        }
        Ok(quota.record_request_deferred())
    }

    /// Write the quota state on the blocking pool, outside the quota lock.
    async fn persist_quota(&self, pending: PendingQuotaWrite) {
        let result = tokio::task::spawn_blocking(move || pending.write())
            .await
            .unwrap_or_else(|e| {
                Err(MarketDataError::Storage(format!(
                    "quota write task failed: {}",
                    e
                )))
            });
        self.lock_quota().finish_write(result);
    }
}

#[async_trait]
impl Dispatch for ClientShared {
    async fn dispatch(&self, symbol: &Symbol) -> Dispatched {
        // An identical request ahead of this one may have filled the cache
        if let Some(hit) = self.cached(symbol) {
            debug!("{} served from cache at dispatch", symbol);
            return Dispatched::local(hit);
        }

        match self.admit() {
            Ok(Some(pending)) => self.persist_quota(pending).await,
            Ok(None) => {}
            Err(e) => {
                info!("Dropping queued request for {}: {}", symbol, e);
                return Dispatched::local(QuoteResult::failure(&e, self.adapter.source()));
            }
        }

        let result = self.adapter.fetch(symbol.as_str()).await;
        if result.success {
            self.lock_cache().put(symbol.clone(), result.clone());
        }
        Dispatched::sent(result)
    }

    fn source(&self) -> &str {
        self.adapter.source()
    }
}

/// Price-fetch client owned by the composition root.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct QuoteClient {
    config: QuoteClientConfig,
    shared: Arc<ClientShared>,
    queue: RequestQueue,
}

impl QuoteClient {
    /// Create a client whose quota rolls over on the local calendar day.
    pub fn new(
        config: QuoteClientConfig,
        provider: Arc<dyn QuoteProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_clock(config, provider, store, Arc::new(LocalQuotaClock))
    }

    pub fn with_clock(
        config: QuoteClientConfig,
        provider: Arc<dyn QuoteProvider>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn QuotaClock>,
    ) -> Self {
        let shared = Arc::new(ClientShared {
            cache: Mutex::new(QuoteCache::new(
                config.cache_ttl(),
                config.max_cache_entries,
            )),
            quota: Mutex::new(QuotaTracker::load(
                config.daily_request_limit,
                store,
                clock,
            )),
            adapter: ProviderAdapter::new(provider),
        });
        let queue = RequestQueue::new(shared.clone(), config.min_dispatch_interval());

        info!(
            "Quote client ready: provider {}, {} requests/day, {:?} spacing, {:?} cache TTL",
            shared.adapter.source(),
            config.daily_request_limit,
            config.min_dispatch_interval(),
            config.cache_ttl()
        );

        Self {
            config,
            shared,
            queue,
        }
    }

    /// Fetch the latest price for one symbol.
    pub async fn fetch_price(&self, symbol: &str) -> QuoteResult {
        let symbol = match Symbol::parse(symbol) {
            Ok(symbol) => symbol,
            Err(e) => return QuoteResult::failure(&e, self.source()),
        };

        if let Some(hit) = self.shared.cached(&symbol) {
            debug!("Cache hit for {}", symbol);
            return hit;
        }

        if let Err(e) = self.shared.check_admission() {
            warn!("Not fetching {}: {}", symbol, e);
            return QuoteResult::failure(&e, self.source());
        }

        self.queue.enqueue(symbol).await
    }

    /// Fetch many symbols one after another.
    ///
    /// Only as many symbols as the remaining quota allows are attempted; the
    /// rest are answered with a "skipped" failure. The output has one entry
    /// per input, in input order. `progress` receives an event after each
    /// attempted symbol completes.
    pub async fn batch_fetch<S: AsRef<str>>(
        &self,
        symbols: &[S],
        progress: &dyn ProgressSink,
    ) -> Vec<BatchQuote> {
        let remaining = self.shared.lock_quota().remaining() as usize;
        let admitted = symbols.len().min(remaining);
        if admitted < symbols.len() {
            warn!(
                "Batch of {} exceeds remaining quota, fetching only {}",
                symbols.len(),
                admitted
            );
        }

        let mut results = Vec::with_capacity(symbols.len());
        for (index, raw) in symbols[..admitted].iter().enumerate() {
            let raw = raw.as_ref();
            let result = self.fetch_price(raw).await;
            results.push(BatchQuote {
                symbol: Symbol::canonicalize(raw),
                result,
            });
            progress.report(BatchProgress::new(index + 1, admitted));
        }

        for raw in &symbols[admitted..] {
            results.push(BatchQuote {
                symbol: Symbol::canonicalize(raw.as_ref()),
                result: QuoteResult::failure(&MarketDataError::QuotaSkipped, self.source()),
            });
        }

        results
    }

    pub fn quota_status(&self) -> QuotaStatus {
        self.shared.lock_quota().status()
    }

    pub fn clear_cache(&self) {
        self.shared.lock_cache().clear();
        info!("Quote cache cleared");
    }

    pub fn cache_len(&self) -> usize {
        self.shared.lock_cache().len()
    }

    pub fn queue_state(&self) -> QueueState {
        self.queue.state()
    }

    pub fn config(&self) -> &QuoteClientConfig {
        &self.config
    }

    /// Identifier of the underlying provider.
    pub fn source(&self) -> &'static str {
        self.shared.adapter.source()
    }
}
