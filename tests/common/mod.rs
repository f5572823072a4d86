#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use service_market::domain::model::{
    Buyer, Category, Creator, CreatorLevel, Money, OrderDetails, Service, ServicePackage,
    ServiceRecord,
};
use service_market::domain::ports::FixedClock;
use service_market::{InMemoryCatalog, InMemoryOrderStore, Marketplace, MemorySink};
use std::sync::Arc;

pub fn creator(id: &str, rating: f64) -> Creator {
    Creator {
        id: id.to_string(),
        name: format!("Creator {}", id),
        avatar: None,
        rating,
        review_count: 10,
        level: CreatorLevel::Tier2,
        verified: true,
        completed_projects: 5,
        response_time: "2h".to_string(),
    }
}

pub fn package(id: &str, price: u64, days: u32) -> ServicePackage {
    ServicePackage {
        id: id.to_string(),
        name: format!("Package {}", id),
        description: String::new(),
        price: Money::from_minor(price),
        delivery_days: days,
        revisions: 1,
        features: vec!["Delivery".to_string()],
    }
}

pub fn service_with(
    id: &str,
    seller: &str,
    category: Category,
    rating: f64,
    packages: Vec<ServicePackage>,
) -> Service {
    Service::try_from(ServiceRecord {
        id: id.to_string(),
        title: format!("Service {}", id),
        description: "Social media content".to_string(),
        category,
        creator: creator(seller, rating),
        packages,
        portfolio: vec![],
        sales_count: 0,
        interested_count: 0,
        tags: vec![],
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    })
    .unwrap()
}

/// One package, priced and timed as given.
pub fn service(id: &str, price: u64, days: u32) -> Service {
    service_with(
        id,
        "seller-1",
        Category::ReelsEditing,
        4.5,
        vec![package(&format!("{}-p1", id), price, days)],
    )
}

pub fn buyer(id: &str) -> Buyer {
    Buyer {
        id: id.to_string(),
        name: format!("Buyer {}", id),
        avatar: None,
    }
}

pub fn details() -> OrderDetails {
    OrderDetails {
        description: "Product launch".to_string(),
        duration: Some("2 weeks".to_string()),
        requirements: "Vertical format".to_string(),
        contact: None,
    }
}

pub fn april_15() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap()
}

pub type TestMarket = Marketplace<InMemoryCatalog, InMemoryOrderStore>;

pub fn market(services: Vec<Service>) -> (TestMarket, MemorySink) {
    market_at(services, april_15())
}

pub fn market_at(services: Vec<Service>, now: DateTime<Utc>) -> (TestMarket, MemorySink) {
    let sink = MemorySink::new();
    let market = Marketplace::with_clock(
        InMemoryCatalog::new(services),
        InMemoryOrderStore::default(),
        Arc::new(sink.clone()),
        Arc::new(FixedClock(now)),
    );
    (market, sink)
}
