use crate::domain::events::EventEnvelope;
use crate::domain::ports::EventSink;
use std::sync::{Arc, Mutex};

/// Writes every event to the log. Used when no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, envelope: EventEnvelope) {
        tracing::info!(event = envelope.name(), user = ?envelope.user_id, "📣 market event");
    }
}

/// Keeps published events in memory, mostly for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<EventEnvelope>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(EventEnvelope::name).collect()
    }
}

impl EventSink for MemorySink {
    fn publish(&self, envelope: EventEnvelope) {
        if let Ok(mut events) = self.events.lock() {
            events.push(envelope);
        }
    }
}

/// Sends each event to every inner sink.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for FanoutSink {
    fn publish(&self, envelope: EventEnvelope) {
        for sink in &self.sinks {
            sink.publish(envelope.clone());
        }
    }
}
