use crate::domain::events::EventEnvelope;
use crate::domain::model::{Order, Service};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Catalog store. Snapshots are immutable; writers never touch a snapshot
/// a reader already holds.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn snapshot(&self) -> Result<Arc<Vec<Service>>>;
    async fn find(&self, service_id: &str) -> Result<Option<Service>>;
    /// Fails with a validation error when the id is already taken.
    async fn insert(&self, service: Service) -> Result<()>;
    /// Fails with not-found when no service has this id.
    async fn replace(&self, service: Service) -> Result<()>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn snapshot(&self) -> Result<Vec<Order>>;
    async fn find(&self, order_id: &str) -> Result<Option<Order>>;
    /// Orders are never overwritten: an existing id is a validation error.
    async fn insert(&self, order: Order) -> Result<()>;
    /// Stores `order` only if the stored copy still has `expected_version`.
    /// Returns `Ok(false)` when another writer got there first.
    async fn compare_and_swap(&self, expected_version: u64, order: Order) -> Result<bool>;
}

/// Outbound event dispatch. `publish` must return immediately; delivery
/// happens elsewhere.
pub trait EventSink: Send + Sync {
    fn publish(&self, envelope: EventEnvelope);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
