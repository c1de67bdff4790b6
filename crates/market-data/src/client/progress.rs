//! Batch progress sinks.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::models::BatchProgress;

/// Receives progress events from a batch fetch.
///
/// `report()` must be fast and non-blocking; a sink that cannot deliver an
/// event drops it. Progress reporting never affects the batch itself.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: BatchProgress);
}

/// Discards progress events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: BatchProgress) {}
}

impl ProgressSink for mpsc::UnboundedSender<BatchProgress> {
    fn report(&self, progress: BatchProgress) {
        // Receiver gone means nobody is listening any more
        let _ = self.send(progress);
    }
}

impl ProgressSink for mpsc::Sender<BatchProgress> {
    fn report(&self, progress: BatchProgress) {
        let _ = self.try_send(progress);
    }
}

/// Collects events in memory.
#[derive(Clone, Default)]
pub struct CollectingProgress {
    events: Arc<Mutex<Vec<BatchProgress>>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<BatchProgress> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressSink for CollectingProgress {
    fn report(&self, progress: BatchProgress) {
        match self.events.lock() {
            Ok(mut events) => events.push(progress),
            Err(poisoned) => poisoned.into_inner().push(progress),
        }
    }
}
