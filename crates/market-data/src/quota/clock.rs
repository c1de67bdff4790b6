use chrono::{Local, NaiveDate};

/// Source of the current calendar day for quota rollover.
pub trait QuotaClock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
///
/// Crossing time zones or a clock adjustment can roll the quota over early
/// or late; the provider's own day boundary is not known to the client.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalQuotaClock;

impl QuotaClock for LocalQuotaClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
