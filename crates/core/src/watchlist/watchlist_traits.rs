use crate::errors::Result;
use crate::watchlist::watchlist_model::{
    NewWatchedInstrument, WatchedInstrument, WatchedInstrumentUpdate,
};
use async_trait::async_trait;

/// Trait for watchlist repository operations
///
/// Symbols passed in are already canonical.
#[async_trait]
pub trait WatchlistRepositoryTrait: Send + Sync {
    fn list(&self) -> Result<Vec<WatchedInstrument>>;
    fn get(&self, symbol: &str) -> Result<Option<WatchedInstrument>>;
    async fn insert(&self, new_instrument: NewWatchedInstrument) -> Result<WatchedInstrument>;
    async fn update(
        &self,
        symbol: &str,
        update: WatchedInstrumentUpdate,
    ) -> Result<WatchedInstrument>;
    async fn delete(&self, symbol: &str) -> Result<usize>;
}

/// Trait for watchlist service operations
#[async_trait]
pub trait WatchlistServiceTrait: Send + Sync {
    fn get_watchlist(&self) -> Result<Vec<WatchedInstrument>>;
    /// Symbols in display order, for batch refreshes
    fn get_symbols(&self) -> Result<Vec<String>>;
    async fn add_instrument(&self, new_instrument: NewWatchedInstrument)
        -> Result<WatchedInstrument>;
    async fn update_instrument(
        &self,
        symbol: &str,
        update: WatchedInstrumentUpdate,
    ) -> Result<WatchedInstrument>;
    async fn remove_instrument(&self, symbol: &str) -> Result<()>;
}
