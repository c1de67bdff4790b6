use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;

use pricewatch_market_data::Symbol;

use super::watchlist_model::{NewWatchedInstrument, WatchedInstrument, WatchedInstrumentUpdate};
use super::watchlist_traits::{WatchlistRepositoryTrait, WatchlistServiceTrait};
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use async_trait::async_trait;

pub struct WatchlistService {
    repository: Arc<dyn WatchlistRepositoryTrait>,
}

impl WatchlistService {
    pub fn new(repository: Arc<dyn WatchlistRepositoryTrait>) -> Self {
        WatchlistService { repository }
    }

    fn canonical_symbol(raw: &str) -> Result<String> {
        let symbol = Symbol::parse(raw)
            .map_err(|e| Error::Validation(ValidationError::InvalidInput(e.to_string())))?;
        Ok(symbol.into())
    }

    fn validate_target_price(target_price: Option<Decimal>) -> Result<()> {
        match target_price {
            Some(price) if price <= Decimal::ZERO => Err(Error::Validation(
                ValidationError::InvalidInput("Target price must be positive".to_string()),
            )),
            _ => Ok(()),
        }
    }

    /// Blank names are stored as absent.
    fn clean_name(name: Option<String>) -> Option<String> {
        name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
    }
}

#[async_trait]
impl WatchlistServiceTrait for WatchlistService {
    fn get_watchlist(&self) -> Result<Vec<WatchedInstrument>> {
        self.repository.list()
    }

    fn get_symbols(&self) -> Result<Vec<String>> {
        Ok(self
            .repository
            .list()?
            .into_iter()
            .map(|instrument| instrument.symbol)
            .collect())
    }

    async fn add_instrument(
        &self,
        new_instrument: NewWatchedInstrument,
    ) -> Result<WatchedInstrument> {
        let symbol = Self::canonical_symbol(&new_instrument.symbol)?;
        Self::validate_target_price(new_instrument.target_price)?;

        if self.repository.get(&symbol)?.is_some() {
            return Err(Error::ConstraintViolation(format!(
                "{} is already on the watchlist",
                symbol
            )));
        }

        debug!("Adding {} to the watchlist", symbol);
        self.repository
            .insert(NewWatchedInstrument {
                symbol,
                name: Self::clean_name(new_instrument.name),
                target_price: new_instrument.target_price,
            })
            .await
    }

    async fn update_instrument(
        &self,
        symbol: &str,
        update: WatchedInstrumentUpdate,
    ) -> Result<WatchedInstrument> {
        let symbol = Self::canonical_symbol(symbol)?;
        Self::validate_target_price(update.target_price)?;

        if self.repository.get(&symbol)?.is_none() {
            return Err(DatabaseError::NotFound(symbol).into());
        }

        self.repository
            .update(
                &symbol,
                WatchedInstrumentUpdate {
                    name: Self::clean_name(update.name),
                    target_price: update.target_price,
                },
            )
            .await
    }

    async fn remove_instrument(&self, symbol: &str) -> Result<()> {
        let symbol = Self::canonical_symbol(symbol)?;
        let deleted = self.repository.delete(&symbol).await?;
        if deleted == 0 {
            return Err(DatabaseError::NotFound(symbol).into());
        }
        debug!("Removed {} from the watchlist", symbol);
        Ok(())
    }
}
