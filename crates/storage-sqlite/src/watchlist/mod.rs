//! SQLite storage implementation for the watchlist.

mod model;
mod repository;

pub use model::{WatchedInstrumentChangesetDB, WatchedInstrumentDB};
pub use repository::WatchlistRepository;
