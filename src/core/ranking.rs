//! Default feed ordering.
//!
//! `score = rating * 20 + sales * 0.5 + interested * 2`. Every weight is
//! positive, so raising any one signal never lowers a listing's rank.

use crate::domain::model::Service;

pub const RATING_WEIGHT: f64 = 20.0;
pub const SALES_WEIGHT: f64 = 0.5;
pub const INTEREST_WEIGHT: f64 = 2.0;

pub fn relevance_score(service: &Service) -> f64 {
    service.creator.rating * RATING_WEIGHT
        + f64::from(service.sales_count) * SALES_WEIGHT
        + f64::from(service.interested_count) * INTEREST_WEIGHT
}

/// Highest score first. Equal scores keep their input order.
pub fn rank_by_relevance(services: Vec<Service>) -> Vec<Service> {
    let mut scored: Vec<(f64, Service)> = services
        .into_iter()
        .map(|s| (relevance_score(&s), s))
        .collect();
    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored.into_iter().map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Category, Creator, CreatorLevel, Money, ServicePackage, ServiceRecord,
    };
    use chrono::Utc;

    fn service(id: &str, rating: f64, sales: u32, interested: u32) -> Service {
        Service::try_from(ServiceRecord {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            category: Category::Consulting,
            creator: Creator {
                id: format!("c-{}", id),
                name: "Creator".to_string(),
                avatar: None,
                rating,
                review_count: 0,
                level: CreatorLevel::Tier1,
                verified: false,
                completed_projects: 0,
                response_time: "1d".to_string(),
            },
            packages: vec![ServicePackage {
                id: "p".to_string(),
                name: "Basic".to_string(),
                description: String::new(),
                price: Money::from_minor(100),
                delivery_days: 1,
                revisions: 0,
                features: vec!["x".to_string()],
            }],
            portfolio: vec![],
            sales_count: sales,
            interested_count: interested,
            tags: vec![],
            created_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn test_score_formula() {
        let s = service("a", 4.5, 10, 3);
        assert!((relevance_score(&s) - (90.0 + 5.0 + 6.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let ranked = rank_by_relevance(vec![
            service("low", 3.0, 0, 0),
            service("high", 5.0, 100, 10),
            service("mid", 4.0, 20, 0),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        // 4.0*20 + 0 + 0 == 3.0*20 + 40*0.5 + 0
        let ranked = rank_by_relevance(vec![
            service("first", 3.0, 40, 0),
            service("second", 4.0, 0, 0),
            service("third", 3.0, 40, 0),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }
}
