pub mod checkout;
pub mod dashboard;
pub mod lifecycle;
pub mod listing;
pub mod market;
pub mod ranking;
pub mod submission;

pub use crate::domain::model::{Order, Service};
pub use crate::domain::ports::{CatalogRepository, EventSink, OrderRepository};
pub use crate::utils::error::Result;
