pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::adapters::{InMemoryCatalog, InMemoryOrderStore, MemorySink, TracingSink, WebhookDispatcher};
pub use crate::core::listing::{query, ListingQuery, PriceBand, SortMode};
pub use crate::core::market::Marketplace;
pub use crate::domain::model::{Actor, Category, Money, Order, OrderAction, OrderStatus, Service};
pub use crate::utils::error::{MarketError, Result};
