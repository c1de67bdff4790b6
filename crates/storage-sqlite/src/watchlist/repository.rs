use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{WatchedInstrumentChangesetDB, WatchedInstrumentDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::watched_instruments;
use crate::schema::watched_instruments::dsl::*;
use pricewatch_core::errors::Result;
use pricewatch_core::watchlist::{
    NewWatchedInstrument, WatchedInstrument, WatchedInstrumentUpdate, WatchlistRepositoryTrait,
};

pub struct WatchlistRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WatchlistRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        WatchlistRepository { pool, writer }
    }
}

#[async_trait]
impl WatchlistRepositoryTrait for WatchlistRepository {
    fn list(&self) -> Result<Vec<WatchedInstrument>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = watched_instruments
            .order((created_at.asc(), symbol.asc()))
            .select(WatchedInstrumentDB::as_select())
            .load::<WatchedInstrumentDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(WatchedInstrument::from).collect())
    }

    fn get(&self, symbol_key: &str) -> Result<Option<WatchedInstrument>> {
        let mut conn = get_connection(&self.pool)?;
        let row = watched_instruments
            .find(symbol_key)
            .select(WatchedInstrumentDB::as_select())
            .first::<WatchedInstrumentDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(WatchedInstrument::from))
    }

    async fn insert(&self, new_instrument: NewWatchedInstrument) -> Result<WatchedInstrument> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<WatchedInstrument> {
                let row = WatchedInstrumentDB::from_new(new_instrument, Utc::now().naive_utc());
                let result_db = diesel::insert_into(watched_instruments::table)
                    .values(&row)
                    .returning(WatchedInstrumentDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(WatchedInstrument::from(result_db))
            })
            .await
    }

    async fn update(
        &self,
        symbol_key: &str,
        update: WatchedInstrumentUpdate,
    ) -> Result<WatchedInstrument> {
        let symbol_owned = symbol_key.to_string();
        let changes = WatchedInstrumentChangesetDB {
            name: update.name,
            target_price: update.target_price.map(|p| p.to_string()),
            updated_at: Utc::now().naive_utc(),
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<WatchedInstrument> {
                let result_db = diesel::update(watched_instruments.find(symbol_owned))
                    .set(&changes)
                    .returning(WatchedInstrumentDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(WatchedInstrument::from(result_db))
            })
            .await
    }

    async fn delete(&self, symbol_key: &str) -> Result<usize> {
        let symbol_owned = symbol_key.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(watched_instruments.find(symbol_owned))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
