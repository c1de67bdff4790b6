//! Short-lived quote cache.
//!
//! Maps a canonical symbol to its last successful [`QuoteResult`]. Entries
//! expire lazily on read once older than the TTL, and the map is bounded by
//! evicting the oldest-inserted entry (insertion order, not recency of
//! access).

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::debug;
use tokio::time::Instant;

use crate::models::{QuoteResult, Symbol};

/// A cached result and the instant it was stored.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub symbol: Symbol,
    pub result: QuoteResult,
    pub fetched_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) > ttl
    }
}

#[derive(Debug)]
pub struct QuoteCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<Symbol, CacheEntry>,
    /// Symbols in insertion order, oldest first.
    order: VecDeque<Symbol>,
}

impl QuoteCache {
    /// `max_entries` is clamped to at least 1.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Look up a fresh entry, dropping it if it has expired.
    pub fn get(&mut self, symbol: &Symbol) -> Option<QuoteResult> {
        let now = Instant::now();
        let entry = self.entries.get(symbol)?;
        if entry.is_expired(self.ttl, now) {
            debug!("Cache entry for {} expired", symbol);
            self.remove(symbol);
            return None;
        }
        Some(entry.result.clone())
    }

    /// Store a result, stamping it with the current instant.
    ///
    /// Overwriting a symbol moves it to the newest position.
    pub fn put(&mut self, symbol: Symbol, result: QuoteResult) {
        if self.entries.contains_key(&symbol) {
            self.order.retain(|s| s != &symbol);
        }
        self.order.push_back(symbol.clone());
        self.entries.insert(
            symbol.clone(),
            CacheEntry {
                symbol,
                result,
                fetched_at: Instant::now(),
            },
        );

        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            debug!("Cache full, evicting {}", oldest);
            self.entries.remove(&oldest);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.contains_key(symbol)
    }

    fn remove(&mut self, symbol: &Symbol) {
        if self.entries.remove(symbol).is_some() {
            self.order.retain(|s| s != symbol);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderQuote;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    const TTL: Duration = Duration::from_secs(60);

    fn sym(raw: &str) -> Symbol {
        Symbol::parse(raw).unwrap()
    }

    fn quote(price: rust_decimal::Decimal) -> QuoteResult {
        QuoteResult::success(ProviderQuote::new(price, "USD", Utc::now()), "TEST")
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_fresh_just_before_ttl() {
        let mut cache = QuoteCache::new(TTL, 10);
        cache.put(sym("AAPL"), quote(dec!(190.12)));

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get(&sym("AAPL")).unwrap().price, Some(dec!(190.12)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_absent_just_after_ttl() {
        let mut cache = QuoteCache::new(TTL, 10);
        cache.put(sym("AAPL"), quote(dec!(190.12)));

        tokio::time::advance(TTL + Duration::from_millis(1)).await;
        assert!(cache.get(&sym("AAPL")).is_none());
        // Expired entry is removed on read
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_refreshes_timestamp() {
        let mut cache = QuoteCache::new(TTL, 10);
        cache.put(sym("MSFT"), quote(dec!(1)));
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.put(sym("MSFT"), quote(dec!(2)));
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(cache.get(&sym("MSFT")).unwrap().price, Some(dec!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_first_inserted() {
        let max = 5;
        let mut cache = QuoteCache::new(TTL, max);
        let symbols = ["A", "B", "C", "D", "E", "F"];
        for s in symbols {
            cache.put(sym(s), quote(dec!(10)));
        }

        assert_eq!(cache.len(), max);
        assert!(!cache.contains(&sym("A")));
        for s in &symbols[1..] {
            assert!(cache.contains(&sym(s)), "{s} should survive");
        }
    }

    #[test]
    fn test_eviction_ignores_reads() {
        let mut cache = QuoteCache::new(TTL, 2);
        cache.put(sym("A"), quote(dec!(1)));
        cache.put(sym("B"), quote(dec!(2)));
        // Reading A does not protect it
        assert!(cache.get(&sym("A")).is_some());
        cache.put(sym("C"), quote(dec!(3)));

        assert!(!cache.contains(&sym("A")));
        assert!(cache.contains(&sym("B")));
        assert!(cache.contains(&sym("C")));
    }

    #[test]
    fn test_overwrite_moves_to_newest() {
        let mut cache = QuoteCache::new(TTL, 2);
        cache.put(sym("A"), quote(dec!(1)));
        cache.put(sym("B"), quote(dec!(2)));
        cache.put(sym("A"), quote(dec!(3)));
        cache.put(sym("C"), quote(dec!(4)));

        assert!(cache.contains(&sym("A")));
        assert!(!cache.contains(&sym("B")));
    }

    #[test]
    fn test_clear() {
        let mut cache = QuoteCache::new(TTL, 10);
        cache.put(sym("A"), quote(dec!(1)));
        cache.put(sym("B"), quote(dec!(2)));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&sym("A")).is_none());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut cache = QuoteCache::new(TTL, 0);
        cache.put(sym("A"), quote(dec!(1)));
        assert_eq!(cache.len(), 1);
    }
}
