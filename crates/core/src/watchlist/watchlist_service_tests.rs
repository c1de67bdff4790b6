use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;

use super::*;
use crate::errors::{DatabaseError, Error, Result};

#[derive(Default)]
struct MockWatchlistRepository {
    rows: Mutex<Vec<WatchedInstrument>>,
}

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 14)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

#[async_trait]
impl WatchlistRepositoryTrait for MockWatchlistRepository {
    fn list(&self) -> Result<Vec<WatchedInstrument>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    fn get(&self, symbol: &str) -> Result<Option<WatchedInstrument>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.symbol == symbol)
            .cloned())
    }

    async fn insert(&self, new_instrument: NewWatchedInstrument) -> Result<WatchedInstrument> {
        let row = WatchedInstrument {
            symbol: new_instrument.symbol,
            name: new_instrument.name,
            target_price: new_instrument.target_price,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        symbol: &str,
        update: WatchedInstrumentUpdate,
    ) -> Result<WatchedInstrument> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.symbol == symbol)
            .ok_or_else(|| DatabaseError::NotFound(symbol.to_string()))?;
        row.name = update.name;
        row.target_price = update.target_price;
        Ok(row.clone())
    }

    async fn delete(&self, symbol: &str) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.symbol != symbol);
        Ok(before - rows.len())
    }
}

fn service() -> (WatchlistService, Arc<MockWatchlistRepository>) {
    let repo = Arc::new(MockWatchlistRepository::default());
    (WatchlistService::new(repo.clone()), repo)
}

fn new_instrument(symbol: &str) -> NewWatchedInstrument {
    NewWatchedInstrument {
        symbol: symbol.to_string(),
        name: None,
        target_price: None,
    }
}

#[tokio::test]
async fn add_canonicalizes_symbol() {
    let (service, _) = service();
    let added = service
        .add_instrument(NewWatchedInstrument {
            symbol: " aapl ".to_string(),
            name: Some("  Apple Inc.  ".to_string()),
            target_price: Some(dec!(250)),
        })
        .await
        .unwrap();

    assert_eq!(added.symbol, "AAPL");
    assert_eq!(added.name.as_deref(), Some("Apple Inc."));
    assert_eq!(service.get_symbols().unwrap(), vec!["AAPL".to_string()]);
}

#[tokio::test]
async fn add_rejects_invalid_symbol() {
    let (service, repo) = service();
    let err = service.add_instrument(new_instrument("BRK/B")).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(repo.list().unwrap().is_empty());
}

#[tokio::test]
async fn add_rejects_duplicate_after_canonicalization() {
    let (service, _) = service();
    service.add_instrument(new_instrument("MSFT")).await.unwrap();

    let err = service.add_instrument(new_instrument("msft")).await.unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn add_rejects_non_positive_target_price() {
    let (service, _) = service();
    let mut input = new_instrument("TSLA");
    input.target_price = Some(dec!(0));

    let err = service.add_instrument(input).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn update_replaces_name_and_target() {
    let (service, _) = service();
    service.add_instrument(new_instrument("NVDA")).await.unwrap();

    let updated = service
        .update_instrument(
            "nvda",
            WatchedInstrumentUpdate {
                name: Some("NVIDIA".to_string()),
                target_price: Some(dec!(140.5)),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name.as_deref(), Some("NVIDIA"));
    assert_eq!(updated.target_price, Some(dec!(140.5)));
}

#[tokio::test]
async fn update_unknown_symbol_is_not_found() {
    let (service, _) = service();
    let err = service
        .update_instrument("AMD", WatchedInstrumentUpdate::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn remove_deletes_and_reports_missing() {
    let (service, _) = service();
    service.add_instrument(new_instrument("IBM")).await.unwrap();

    service.remove_instrument("ibm").await.unwrap();
    assert!(service.get_watchlist().unwrap().is_empty());

    let err = service.remove_instrument("IBM").await.unwrap_err();
    assert!(err.is_not_found());
}
