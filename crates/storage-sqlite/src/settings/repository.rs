use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::model::AppSettingDB;
use crate::db::DbPool;
use crate::errors::StorageError;
use crate::schema::app_settings::dsl::*;
use pricewatch_market_data::{KeyValueStore, MarketDataError};

/// `app_settings`-backed store for the quota counter.
///
/// Writes go straight through the pool instead of the writer actor because
/// the quota tracker records synchronously while holding its own lock.
pub struct SqliteKeyValueStore {
    pool: Arc<DbPool>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        SqliteKeyValueStore { pool }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, MarketDataError> {
        let mut conn = self.pool.get().map_err(StorageError::from)?;
        let value = app_settings
            .filter(setting_key.eq(key))
            .select(setting_value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MarketDataError> {
        let mut conn = self.pool.get().map_err(StorageError::from)?;
        diesel::replace_into(app_settings)
            .values(&AppSettingDB {
                setting_key: key.to_string(),
                setting_value: value.to_string(),
            })
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        debug!("Persisted setting {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::setup_pool;
    use chrono::NaiveDate;
    use pricewatch_market_data::{QuotaClock, QuotaTracker};

    struct FixedClock(NaiveDate);

    impl QuotaClock for FixedClock {
        fn today(&self) -> NaiveDate {
            self.0
        }
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (_dir, pool) = setup_pool();
        let store = SqliteKeyValueStore::new(pool);
        assert_eq!(store.get("price_api_request_count").unwrap(), None);
    }

    #[test]
    fn set_overwrites_existing_value() {
        let (_dir, pool) = setup_pool();
        let store = SqliteKeyValueStore::new(pool);

        store.set("price_api_request_count", "3").unwrap();
        store.set("price_api_request_count", "4").unwrap();

        assert_eq!(
            store.get("price_api_request_count").unwrap().as_deref(),
            Some("4")
        );
    }

    #[test]
    fn quota_survives_reopening_the_store() {
        let (_dir, pool) = setup_pool();
        let today = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();

        {
            let store = Arc::new(SqliteKeyValueStore::new(pool.clone()));
            let mut tracker = QuotaTracker::load(3, store, Arc::new(FixedClock(today)));
            tracker.record_request();
            tracker.record_request();
        }

        let store = Arc::new(SqliteKeyValueStore::new(pool));
        let mut tracker = QuotaTracker::load(3, store, Arc::new(FixedClock(today)));
        assert_eq!(tracker.remaining(), 1);
        assert!(!tracker.is_degraded());
    }
}
