//! Daily request quota tracking.
//!
//! Counts outbound requests made "today" against a fixed ceiling. The count
//! and the day it belongs to are persisted through a [`KeyValueStore`]; when
//! the calendar day changes the count resets before any admission check.
//! Persistence failures degrade the tracker to in-memory operation for the
//! rest of the process lifetime instead of failing callers.

mod clock;

pub use clock::{LocalQuotaClock, QuotaClock};

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;
use crate::store::KeyValueStore;

/// Persisted request count key.
pub const QUOTA_COUNT_KEY: &str = "price_api_request_count";

/// Persisted reset date key (ISO `YYYY-MM-DD`).
pub const QUOTA_RESET_DATE_KEY: &str = "price_api_reset_date";

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Persisted quota state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaState {
    pub count: u32,
    /// Day for which `count` is valid
    pub reset_date_key: String,
}

impl QuotaState {
    fn fresh(today: NaiveDate) -> Self {
        Self {
            count: 0,
            reset_date_key: date_key(today),
        }
    }
}

/// Snapshot of quota usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub can_admit: bool,
}

/// A counted request whose state has not been written to the store yet.
///
/// Produced by [`QuotaTracker::record_request_deferred`] so the write can run
/// without holding the tracker. Report the outcome back through
/// [`QuotaTracker::finish_write`].
#[must_use]
pub struct PendingQuotaWrite {
    store: Arc<dyn KeyValueStore>,
    state: QuotaState,
}

impl PendingQuotaWrite {
    /// Write the count and its day. Blocks on the store.
    pub fn write(self) -> Result<(), MarketDataError> {
        self.store
            .set(QUOTA_COUNT_KEY, &self.state.count.to_string())?;
        self.store
            .set(QUOTA_RESET_DATE_KEY, &self.state.reset_date_key)
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub struct QuotaTracker {
    limit: u32,
    state: QuotaState,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn QuotaClock>,
    /// Set after the first persistence failure; no further writes are attempted.
    degraded: bool,
}

impl QuotaTracker {
    /// Load the persisted state, falling back to a fresh count.
    pub fn load(limit: u32, store: Arc<dyn KeyValueStore>, clock: Arc<dyn QuotaClock>) -> Self {
        let today = clock.today();
        let mut degraded = false;

        let count = match store.get(QUOTA_COUNT_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                warn!("Ignoring unparseable quota count '{}'", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!("Quota state unavailable, tracking in memory only: {}", e);
                degraded = true;
                0
            }
        };
        let reset_date_key = if degraded {
            None
        } else {
            match store.get(QUOTA_RESET_DATE_KEY) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Quota state unavailable, tracking in memory only: {}", e);
                    degraded = true;
                    None
                }
            }
        };

        let state = match reset_date_key {
            Some(key) => QuotaState {
                count,
                reset_date_key: key,
            },
            None => QuotaState::fresh(today),
        };

        let mut tracker = Self {
            limit,
            state,
            store,
            clock,
            degraded,
        };
        tracker.roll_over();
        debug!(
            "Quota loaded: {}/{} used for {}",
            tracker.state.count, tracker.limit, tracker.state.reset_date_key
        );
        tracker
    }

    /// Whether another outbound request may be made today.
    pub fn can_admit(&mut self) -> bool {
        self.roll_over();
        self.state.count < self.limit
    }

    /// Count one outbound request.
    ///
    /// Called before the network call: a request that fails after reaching
    /// the provider has still consumed quota.
    pub fn record_request(&mut self) {
        if let Some(pending) = self.record_request_deferred() {
            let result = pending.write();
            self.finish_write(result);
        }
    }

    /// Count one outbound request in memory and return the store write.
    ///
    /// `None` once the tracker is degraded.
    pub fn record_request_deferred(&mut self) -> Option<PendingQuotaWrite> {
        self.roll_over();
        self.state.count = self.state.count.saturating_add(1);
        self.pending_write()
    }

    /// Apply the outcome of a [`PendingQuotaWrite`].
    pub fn finish_write(&mut self, result: Result<(), MarketDataError>) {
        if let Err(e) = result {
            if !self.degraded {
                warn!(
                    "Failed to persist quota state, continuing in memory only: {}",
                    e
                );
                self.degraded = true;
            }
        }
    }

    pub fn remaining(&mut self) -> u32 {
        self.roll_over();
        self.limit.saturating_sub(self.state.count)
    }

    pub fn status(&mut self) -> QuotaStatus {
        self.roll_over();
        QuotaStatus {
            used: self.state.count,
            limit: self.limit,
            remaining: self.limit.saturating_sub(self.state.count),
            can_admit: self.state.count < self.limit,
        }
    }

    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether persistence has been abandoned for this process.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Reset the count if the stored day is not today.
    fn roll_over(&mut self) {
        let today = date_key(self.clock.today());
        if self.state.reset_date_key != today {
            info!(
                "New quota day {} (was {}, {} requests used), resetting count",
                today, self.state.reset_date_key, self.state.count
            );
            self.state = QuotaState {
                count: 0,
                reset_date_key: today,
            };
            self.persist();
        }
    }

    fn pending_write(&self) -> Option<PendingQuotaWrite> {
        if self.degraded {
            return None;
        }
        Some(PendingQuotaWrite {
            store: self.store.clone(),
            state: self.state.clone(),
        })
    }

    fn persist(&mut self) {
        if let Some(pending) = self.pending_write() {
            let result = pending.write();
            self.finish_write(result);
        }
    }
}
