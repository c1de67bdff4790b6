//! Pricewatch Core - Portfolio store domain entities, services, and traits.
//!
//! This crate holds the list of tracked instruments the quote client is
//! asked to refresh. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod errors;
pub mod watchlist;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
