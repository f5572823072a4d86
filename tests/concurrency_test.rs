mod common;

use common::{buyer, details, market, service};
use service_market::domain::events::MarketEvent;
use service_market::{Actor, MarketError, OrderAction, OrderStatus};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_accept_and_reject_race_has_one_winner() {
    for _ in 0..20 {
        let (market, sink) = market(vec![service("s1", 100, 1)]);
        let market = Arc::new(market);
        let id = market
            .checkout("s1", "s1-p1", buyer("b1"), details())
            .await
            .unwrap()
            .id;

        let accept = tokio::spawn({
            let market = market.clone();
            let id = id.clone();
            async move { market.act(&id, OrderAction::Accept, Actor::Seller).await }
        });
        let reject = tokio::spawn({
            let market = market.clone();
            let id = id.clone();
            async move { market.act(&id, OrderAction::Reject, Actor::Seller).await }
        });

        let outcomes = [accept.await.unwrap(), reject.await.unwrap()];
        let winners: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);

        let loser = outcomes.iter().find_map(|o| o.as_ref().err()).unwrap();
        assert!(matches!(loser, MarketError::InvalidTransition { .. }));

        let order = market.order(&id).await.unwrap();
        assert_eq!(order.status(), winners[0].to_status);
        assert_eq!(order.version(), 1);

        let transitions = sink
            .events()
            .iter()
            .filter(|e| matches!(e.event, MarketEvent::OrderTransition(_)))
            .count();
        assert_eq!(transitions, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_orders_progress_in_parallel() {
    let (market, _) = market(vec![service("s1", 100, 1)]);
    let market = Arc::new(market);

    let mut ids = Vec::new();
    for i in 0..16 {
        let order = market
            .checkout("s1", "s1-p1", buyer(&format!("b{}", i)), details())
            .await
            .unwrap();
        ids.push(order.id);
    }

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let market = market.clone();
            tokio::spawn(async move {
                market.act(&id, OrderAction::Accept, Actor::Seller).await?;
                market.act(&id, OrderAction::Complete, Actor::Seller).await
            })
        })
        .collect();

    for handle in handles {
        let event = handle.await.unwrap().unwrap();
        assert_eq!(event.to_status, OrderStatus::Completed);
    }
    for id in &ids {
        assert_eq!(market.order(id).await.unwrap().version(), 2);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_accept_succeeds_once() {
    let (market, _) = market(vec![service("s1", 100, 1)]);
    let market = Arc::new(market);
    let id = market
        .checkout("s1", "s1-p1", buyer("b1"), details())
        .await
        .unwrap()
        .id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let market = market.clone();
            let id = id.clone();
            tokio::spawn(async move { market.act(&id, OrderAction::Accept, Actor::Seller).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert!(matches!(
                e,
                MarketError::InvalidTransition {
                    from: OrderStatus::InProgress,
                    ..
                }
            )),
        }
    }
    assert_eq!(accepted, 1);
}
