use serde::{Deserialize, Serialize};

/// Classification of a failed fetch.
///
/// Copied onto every failed [`QuoteResult`](crate::QuoteResult) so callers can
/// branch on the failure category without parsing message text.
///
/// | Kind | Network call made? | Counts against quota? |
/// |------|--------------------|-----------------------|
/// | `Validation` | No | No |
/// | `QuotaExceeded` | No | No |
/// | `Transport` | Yes | Yes |
/// | `Data` | Yes | Yes |
/// | `Storage` | No | No |
/// | `Internal` | Maybe | Maybe |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed symbol, rejected before any I/O or quota consumption.
    Validation,

    /// Admission denied because the daily request budget is spent.
    QuotaExceeded,

    /// Network or HTTP failure talking to the provider.
    Transport,

    /// Well-formed response without a usable price.
    Data,

    /// The persistence backend failed.
    Storage,

    /// The request was lost inside the client (dropped reply, panicking provider).
    Internal,
}

impl ErrorKind {
    /// Whether a failure of this kind means the provider was contacted.
    pub fn reached_provider(self) -> bool {
        matches!(self, Self::Transport | Self::Data)
    }
}
