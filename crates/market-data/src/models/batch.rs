use serde::{Deserialize, Serialize};

use super::quote::QuoteResult;

/// One entry of a batch fetch, in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchQuote {
    pub symbol: String,

    #[serde(flatten)]
    pub result: QuoteResult,
}

/// Progress of a batch fetch, reported after each completed symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
    /// Whole-number percentage, rounded to nearest
    pub percentage: u8,
}

impl BatchProgress {
    pub fn new(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((current.min(total) as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            current,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}
