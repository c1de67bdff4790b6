//! Serialized request queue.
//!
//! Turns any number of concurrent fetch requests into a single FIFO stream
//! of dispatches with a minimum spacing between them. At most one dispatch
//! is in flight at a time, which is what keeps the client within the
//! provider's rate limit.
//!
//! The queue has two states. It is `Idle` when empty with no drain running;
//! the first enqueue spawns a drain task and moves it to `Draining`. The
//! drain pops items one at a time and, when the dispatch reached the
//! provider and more items are waiting, sleeps the minimum interval before
//! popping the next. Once a pop finds the queue empty the drain ends and the
//! queue is `Idle` again.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::errors::MarketDataError;
use crate::models::{QuoteResult, Symbol};
use crate::provider::ProviderAdapter;

/// Outcome of one dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatched {
    pub result: QuoteResult,
    /// Whether a provider call was made. Only these are spaced apart.
    pub reached_provider: bool,
}

impl Dispatched {
    /// Result obtained from the provider.
    pub fn sent(result: QuoteResult) -> Self {
        Self {
            result,
            reached_provider: true,
        }
    }

    /// Result answered without calling the provider.
    pub fn local(result: QuoteResult) -> Self {
        Self {
            result,
            reached_provider: false,
        }
    }
}

/// Work performed for each dequeued symbol.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Produce the result for one symbol. Must not fail.
    async fn dispatch(&self, symbol: &Symbol) -> Dispatched;

    /// Source label for results the queue has to synthesize.
    fn source(&self) -> &str;
}

#[async_trait]
impl Dispatch for ProviderAdapter {
    async fn dispatch(&self, symbol: &Symbol) -> Dispatched {
        Dispatched::sent(self.fetch(symbol.as_str()).await)
    }

    fn source(&self) -> &str {
        ProviderAdapter::source(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueState {
    /// Queue empty, no drain running
    Idle,
    /// A drain task is popping and dispatching
    Draining,
}

struct QueueItem {
    symbol: Symbol,
    reply: oneshot::Sender<QuoteResult>,
}

struct QueueInner {
    items: VecDeque<QueueItem>,
    draining: bool,
}

struct QueueShared {
    inner: Mutex<QueueInner>,
    dispatcher: Arc<dyn Dispatch>,
    min_interval: Duration,
}

impl QueueShared {
    /// Lock the queue, recovering from poison if necessary.
    fn lock_inner(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Request queue mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// FIFO queue with a single drain loop per instance.
#[derive(Clone)]
pub struct RequestQueue {
    shared: Arc<QueueShared>,
}

impl RequestQueue {
    pub fn new(dispatcher: Arc<dyn Dispatch>, min_interval: Duration) -> Self {
        Self {
            shared: Arc::new(QueueShared {
                inner: Mutex::new(QueueInner {
                    items: VecDeque::new(),
                    draining: false,
                }),
                dispatcher,
                min_interval,
            }),
        }
    }

    /// Queue a symbol and wait for its turn.
    ///
    /// Always resolves; there is no cancellation. Must be called from within
    /// a Tokio runtime since the first enqueue spawns the drain task.
    pub async fn enqueue(&self, symbol: Symbol) -> QuoteResult {
        let (reply, receiver) = oneshot::channel();
        let label = symbol.to_string();

        let start_drain = {
            let mut inner = self.shared.lock_inner();
            inner.items.push_back(QueueItem { symbol, reply });
            let was_idle = !inner.draining;
            inner.draining = true;
            debug!("Queued {} ({} waiting)", label, inner.items.len());
            was_idle
        };

        if start_drain {
            tokio::spawn(drain(self.shared.clone()));
        }

        match receiver.await {
            Ok(result) => result,
            Err(_) => {
                error!("Request for {} was dropped before dispatch", label);
                QuoteResult::failure(
                    &MarketDataError::Dropped(format!("queue stopped before {} was fetched", label)),
                    self.shared.dispatcher.source(),
                )
            }
        }
    }

    pub fn state(&self) -> QueueState {
        if self.shared.lock_inner().draining {
            QueueState::Draining
        } else {
            QueueState::Idle
        }
    }

    /// Items waiting for dispatch (the one in flight excluded).
    pub fn len(&self) -> usize {
        self.shared.lock_inner().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn min_interval(&self) -> Duration {
        self.shared.min_interval
    }
}

async fn drain(shared: Arc<QueueShared>) {
    loop {
        let item = {
            let mut inner = shared.lock_inner();
            match inner.items.pop_front() {
                Some(item) => item,
                None => {
                    inner.draining = false;
                    debug!("Request queue drained");
                    return;
                }
            }
        };

        let QueueItem { symbol, reply } = item;
        let Dispatched {
            result,
            reached_provider,
        } = AssertUnwindSafe(shared.dispatcher.dispatch(&symbol))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!("Dispatch for {} panicked", symbol);
                // The provider may have been called before the panic
                Dispatched::sent(QuoteResult::failure(
                    &MarketDataError::Dropped(format!("fetch for {} panicked", symbol)),
                    shared.dispatcher.source(),
                ))
            });

        if reply.send(result).is_err() {
            debug!("Caller for {} stopped waiting", symbol);
        }

        if !reached_provider {
            continue;
        }
        let waiting = shared.lock_inner().items.len();
        if waiting > 0 {
            debug!(
                "Waiting {:?} before next dispatch ({} queued)",
                shared.min_interval, waiting
            );
            tokio::time::sleep(shared.min_interval).await;
        }
    }
}
