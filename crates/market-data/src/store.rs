//! Key-value persistence port.
//!
//! The quota tracker persists two scalar values through this trait so the
//! core stays independent of the storage technology. The SQLite
//! implementation lives in `pricewatch-storage-sqlite`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::warn;

use crate::errors::MarketDataError;

/// Minimal string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, MarketDataError>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> Result<(), MarketDataError>;
}

/// Process-local store, for tests and deployments without a database.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the map, recovering from poison if necessary.
    fn lock_values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| {
            warn!("In-memory store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, MarketDataError> {
        Ok(self.lock_values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MarketDataError> {
        self.lock_values()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
