// Adapters layer: concrete implementations of the domain ports (storage, event delivery, seed files).

pub mod memory;
pub mod seed;
pub mod sink;
pub mod webhook;

pub use memory::{InMemoryCatalog, InMemoryOrderStore};
pub use sink::{FanoutSink, MemorySink, TracingSink};
pub use webhook::{DispatchReport, WebhookDispatcher, WebhookSettings};
