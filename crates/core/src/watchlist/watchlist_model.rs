//! Watchlist domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain model representing a tracked instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedInstrument {
    /// Canonical symbol, the record key
    pub symbol: String,
    pub name: Option<String>,
    /// Price the user wants to be told about
    pub target_price: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for tracking a new instrument
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchedInstrument {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_price: Option<Decimal>,
}

/// Replacement values for an existing instrument
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WatchedInstrumentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_price: Option<Decimal>,
}
