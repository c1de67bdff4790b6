//! Database models for watched instruments.

use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::warn;
use rust_decimal::Decimal;

use pricewatch_core::watchlist::{NewWatchedInstrument, WatchedInstrument};

/// Database model for watched instruments. Decimals are stored as text.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::watched_instruments)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WatchedInstrumentDB {
    pub symbol: String,
    pub name: Option<String>,
    pub target_price: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full replacement of the editable columns; `None` clears a column.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::watched_instruments)]
#[diesel(treat_none_as_null = true)]
pub struct WatchedInstrumentChangesetDB {
    pub name: Option<String>,
    pub target_price: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl WatchedInstrumentDB {
    pub fn from_new(new_instrument: NewWatchedInstrument, now: NaiveDateTime) -> Self {
        WatchedInstrumentDB {
            symbol: new_instrument.symbol,
            name: new_instrument.name,
            target_price: new_instrument.target_price.map(|p| p.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<WatchedInstrumentDB> for WatchedInstrument {
    fn from(db: WatchedInstrumentDB) -> Self {
        let target_price = db.target_price.as_deref().and_then(|raw| {
            Decimal::from_str(raw)
                .map_err(|e| warn!("Ignoring malformed target price for {}: {}", db.symbol, e))
                .ok()
        });
        WatchedInstrument {
            symbol: db.symbol,
            name: db.name,
            target_price,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
