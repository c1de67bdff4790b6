use pricewatch_market_data::{BatchProgress, ProgressSink};
use serde_json::Value;
use tokio::sync::broadcast;

/// Canonical event names pushed to stream subscribers.
pub const QUOTES_REFRESH_PROGRESS: &str = "quotes:refresh-progress";
pub const QUOTES_REFRESH_COMPLETE: &str = "quotes:refresh-complete";

/// Serializable envelope that carries event names and optional payloads.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

/// Lightweight broadcast bus that fans out events to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // No subscribers is fine; lagging ones lose events.
        let _ = self.sender.send(event);
    }
}

/// Publishes batch progress as `quotes:refresh-progress` events.
impl ProgressSink for EventBus {
    fn report(&self, progress: BatchProgress) {
        match serde_json::to_value(progress) {
            Ok(payload) => self.publish(ServerEvent::with_payload(QUOTES_REFRESH_PROGRESS, payload)),
            Err(err) => tracing::error!("Failed to serialize refresh progress: {}", err),
        }
    }
}
