use crate::adapters::memory::{InMemoryCatalog, InMemoryOrderStore};
use crate::core::checkout::verify_order_package;
use crate::domain::model::{Order, Service};
use crate::domain::ports::{CatalogRepository, OrderRepository};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// JSON file with the catalog and the orders placed against it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Validate for Seed {
    /// 每筆訂單都必須指向存在的服務，且方案屬於該服務
    fn validate(&self) -> Result<()> {
        let services: HashMap<&str, &Service> =
            self.services.iter().map(|s| (s.id.as_str(), s)).collect();
        if services.len() != self.services.len() {
            return Err(MarketError::validation("Seed contains duplicate service ids"));
        }

        for order in &self.orders {
            let service = services
                .get(order.service_id.as_str())
                .ok_or_else(|| MarketError::not_found("service", order.service_id.clone()))?;
            verify_order_package(order, service)?;
        }
        Ok(())
    }
}

impl Seed {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let seed: Seed = serde_json::from_str(content)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn into_stores(self) -> Result<(InMemoryCatalog, InMemoryOrderStore)> {
        Ok((
            InMemoryCatalog::new(self.services),
            InMemoryOrderStore::new(self.orders)?,
        ))
    }

    pub async fn capture<C: CatalogRepository, O: OrderRepository>(catalog: &C, orders: &O) -> Result<Self> {
        Ok(Self {
            services: (*catalog.snapshot().await?).clone(),
            orders: orders.snapshot().await?,
        })
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
