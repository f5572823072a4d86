use crate::domain::model::{Order, Service};
use crate::domain::ports::{CatalogRepository, OrderRepository};
use crate::utils::error::{MarketError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Copy-on-write catalog: readers clone the `Arc`, writers build a new list.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    services: RwLock<Arc<Vec<Service>>>,
}

impl InMemoryCatalog {
    pub fn new(services: Vec<Service>) -> Self {
        Self {
            services: RwLock::new(Arc::new(services)),
        }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn snapshot(&self) -> Result<Arc<Vec<Service>>> {
        Ok(Arc::clone(&*self.services.read().await))
    }

    async fn find(&self, service_id: &str) -> Result<Option<Service>> {
        let services = self.services.read().await;
        Ok(services.iter().find(|s| s.id == service_id).cloned())
    }

    async fn insert(&self, service: Service) -> Result<()> {
        let mut services = self.services.write().await;
        if services.iter().any(|s| s.id == service.id) {
            return Err(MarketError::validation(format!(
                "Service '{}' already exists",
                service.id
            )));
        }
        let mut next: Vec<Service> = (**services).clone();
        next.push(service);
        *services = Arc::new(next);
        Ok(())
    }

    async fn replace(&self, service: Service) -> Result<()> {
        let mut services = self.services.write().await;
        let index = services
            .iter()
            .position(|s| s.id == service.id)
            .ok_or_else(|| MarketError::not_found("service", service.id.clone()))?;
        let mut next: Vec<Service> = (**services).clone();
        next[index] = service;
        *services = Arc::new(next);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct OrderTable {
    orders: Vec<Order>,
    index: HashMap<String, usize>,
}

/// Orders in insertion order. All writes go through one lock, which is what
/// makes `compare_and_swap` atomic.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    table: RwLock<OrderTable>,
}

impl InMemoryOrderStore {
    pub fn new(orders: Vec<Order>) -> Result<Self> {
        let mut table = OrderTable::default();
        for order in orders {
            if table.index.contains_key(&order.id) {
                return Err(MarketError::validation(format!(
                    "Order '{}' appears twice",
                    order.id
                )));
            }
            table.index.insert(order.id.clone(), table.orders.len());
            table.orders.push(order);
        }
        Ok(Self {
            table: RwLock::new(table),
        })
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn snapshot(&self) -> Result<Vec<Order>> {
        Ok(self.table.read().await.orders.clone())
    }

    async fn find(&self, order_id: &str) -> Result<Option<Order>> {
        let table = self.table.read().await;
        Ok(table.index.get(order_id).map(|&i| table.orders[i].clone()))
    }

    async fn insert(&self, order: Order) -> Result<()> {
        let mut table = self.table.write().await;
        if table.index.contains_key(&order.id) {
            return Err(MarketError::validation(format!(
                "Order '{}' already exists",
                order.id
            )));
        }
        let position = table.orders.len();
        table.index.insert(order.id.clone(), position);
        table.orders.push(order);
        Ok(())
    }

    async fn compare_and_swap(&self, expected_version: u64, order: Order) -> Result<bool> {
        let mut table = self.table.write().await;
        let index = *table
            .index
            .get(&order.id)
            .ok_or_else(|| MarketError::not_found("order", order.id.clone()))?;

        if table.orders[index].version() != expected_version {
            return Ok(false);
        }
        table.orders[index] = order;
        Ok(true)
    }
}
