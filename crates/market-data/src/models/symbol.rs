use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Maximum length of a ticker symbol.
pub const MAX_SYMBOL_LEN: usize = 10;

/// Canonical instrument symbol.
///
/// Always uppercase, 1-10 ASCII alphanumeric characters. A `Symbol` is the
/// join key between the cache, the request queue, the provider and the
/// watchlist, so it can only be obtained through [`Symbol::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Canonicalize and validate a raw symbol.
    ///
    /// ```
    /// use pricewatch_market_data::Symbol;
    ///
    /// assert_eq!(Symbol::parse(" aapl ").unwrap().as_str(), "AAPL");
    /// assert!(Symbol::parse("BRK.B").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, MarketDataError> {
        let canonical = Self::canonicalize(raw);
        if canonical.is_empty()
            || canonical.len() > MAX_SYMBOL_LEN
            || !canonical.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(MarketDataError::InvalidSymbol(raw.trim().to_string()));
        }
        Ok(Self(canonical))
    }

    /// Trim and uppercase without validating.
    ///
    /// Used to label results for inputs that failed validation.
    pub fn canonicalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonicalizes() {
        assert_eq!(Symbol::parse("msft").unwrap().as_str(), "MSFT");
        assert_eq!(Symbol::parse("  goog\t").unwrap().as_str(), "GOOG");
        assert_eq!(Symbol::parse("7203").unwrap().as_str(), "7203");
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(Symbol::parse("A").is_ok());
        assert!(Symbol::parse("ABCDEFGHIJ").is_ok());
        assert!(Symbol::parse("ABCDEFGHIJK").is_err());
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("   ").is_err());
    }

    #[test]
    fn test_parse_rejects_punctuation() {
        for raw in ["BRK.B", "BTC-USD", "EUR/USD", "A B", "ÄPFEL"] {
            let err = Symbol::parse(raw).unwrap_err();
            assert!(matches!(err, MarketDataError::InvalidSymbol(_)), "{raw}");
        }
    }

    #[test]
    fn test_serde_validates() {
        let symbol: Symbol = serde_json::from_str("\"nvda\"").unwrap();
        assert_eq!(symbol.as_str(), "NVDA");
        assert_eq!(serde_json::to_string(&symbol).unwrap(), "\"NVDA\"");
        assert!(serde_json::from_str::<Symbol>("\"NV-DA\"").is_err());
    }
}
