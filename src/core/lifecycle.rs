//! Order lifecycle.
//!
//! ```text
//! pending --accept(seller)--> in_progress --complete(seller)--> completed
//!    |                          |     ^
//!    reject(seller)   request_revision  resubmit(buyer)
//!    v                (either)  v     |
//! cancelled                   revision --complete(seller)--> completed
//! ```
//!
//! Anything not on this table is an `InvalidTransition` and the order is
//! left as it was.

use crate::domain::events::{Notice, SideEffect, TransitionEvent};
use crate::domain::model::{Actor, Money, Order, OrderAction, OrderStatus};
use crate::utils::error::{MarketError, Result};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: OrderStatus,
    pub side_effect: SideEffect,
}

/// The transition table. `amount` is what a completion releases.
pub fn resolve(
    from: OrderStatus,
    action: OrderAction,
    actor: Actor,
    amount: Money,
) -> Result<Transition> {
    use OrderAction::*;
    use OrderStatus::*;

    let (to, side_effect) = match (from, action, actor) {
        (Pending, Accept, Actor::Seller) => (
            InProgress,
            SideEffect::Notify {
                recipient: Actor::Buyer,
                notice: Notice::Accepted,
            },
        ),
        (Pending, Reject, Actor::Seller) => (
            Cancelled,
            SideEffect::Notify {
                recipient: Actor::Buyer,
                notice: Notice::RefundIssued,
            },
        ),
        (InProgress, RequestRevision, requester) => (
            Revision,
            SideEffect::Notify {
                recipient: requester.counterpart(),
                notice: Notice::RevisionRequested,
            },
        ),
        (InProgress | Revision, Complete, Actor::Seller) => {
            (Completed, SideEffect::ReleasePayment { amount })
        }
        (Revision, Resubmit, Actor::Buyer) => (
            InProgress,
            SideEffect::Notify {
                recipient: Actor::Seller,
                notice: Notice::Resubmitted,
            },
        ),
        _ => {
            return Err(MarketError::InvalidTransition {
                from,
                action,
                actor,
            })
        }
    };

    Ok(Transition { to, side_effect })
}

pub fn is_allowed(from: OrderStatus, action: OrderAction, actor: Actor) -> bool {
    resolve(from, action, actor, Money::ZERO).is_ok()
}

/// Actions `actor` may take on an order in `status`, in table order.
pub fn available_actions(status: OrderStatus, actor: Actor) -> Vec<OrderAction> {
    OrderAction::ALL
        .into_iter()
        .filter(|action| is_allowed(status, *action, actor))
        .collect()
}

/// Computes the next version of `order`. The input is never modified, so a
/// rejected action cannot leave a half-applied order behind.
pub fn apply(
    order: &Order,
    action: OrderAction,
    actor: Actor,
    at: DateTime<Utc>,
) -> Result<(Order, TransitionEvent)> {
    let from = order.status();
    let transition = resolve(from, action, actor, order.total_price)?;

    let mut next = order.clone();
    next.advance(transition.to, at);

    let event = TransitionEvent {
        order_id: order.id.clone(),
        action,
        actor,
        from_status: from,
        to_status: transition.to,
        timestamp: at,
        side_effect: transition.side_effect,
    };

    Ok((next, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checkout::place_order;
    use crate::domain::model::{
        Buyer, Category, Creator, CreatorLevel, OrderDetails, Service, ServicePackage,
        ServiceRecord,
    };
    use chrono::TimeZone;

    fn pending_order() -> Order {
        let created = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let service = Service::try_from(ServiceRecord {
            id: "s1".to_string(),
            title: "Script".to_string(),
            description: "Scripts".to_string(),
            category: Category::Scriptwriting,
            creator: Creator {
                id: "seller-1".to_string(),
                name: "Seller".to_string(),
                avatar: None,
                rating: 4.8,
                review_count: 3,
                level: CreatorLevel::Tier3,
                verified: true,
                completed_projects: 8,
                response_time: "1h".to_string(),
            },
            packages: vec![ServicePackage {
                id: "s1-p1".to_string(),
                name: "Basic".to_string(),
                description: String::new(),
                price: Money::from_minor(25_000),
                delivery_days: 3,
                revisions: 1,
                features: vec!["1 script".to_string()],
            }],
            portfolio: vec![],
            sales_count: 0,
            interested_count: 0,
            tags: vec![],
            created_at: created,
        })
        .unwrap();

        place_order(
            "o1".to_string(),
            &service,
            "s1-p1",
            Buyer {
                id: "buyer-1".to_string(),
                name: "Buyer".to_string(),
                avatar: None,
            },
            OrderDetails {
                description: "Launch video".to_string(),
                duration: None,
                requirements: "Portuguese".to_string(),
                contact: None,
            },
            created,
        )
        .unwrap()
    }

    fn step(order: &Order, action: OrderAction, actor: Actor) -> Result<Order> {
        let at = Utc.with_ymd_and_hms(2024, 5, 11, 9, 0, 0).unwrap();
        apply(order, action, actor, at).map(|(next, _)| next)
    }

    #[test]
    fn test_accept_notifies_buyer() {
        let order = pending_order();
        let at = Utc.with_ymd_and_hms(2024, 5, 11, 9, 0, 0).unwrap();
        let (next, event) = apply(&order, OrderAction::Accept, Actor::Seller, at).unwrap();

        assert_eq!(next.status(), OrderStatus::InProgress);
        assert_eq!(next.version(), order.version() + 1);
        assert_eq!(event.from_status, OrderStatus::Pending);
        assert_eq!(event.to_status, OrderStatus::InProgress);
        assert_eq!(
            event.side_effect,
            SideEffect::Notify {
                recipient: Actor::Buyer,
                notice: Notice::Accepted
            }
        );
    }

    #[test]
    fn test_reject_then_accept_is_invalid() {
        let cancelled = step(&pending_order(), OrderAction::Reject, Actor::Seller).unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);

        let err = step(&cancelled, OrderAction::Accept, Actor::Seller).unwrap_err();
        assert!(matches!(
            err,
            MarketError::InvalidTransition {
                from: OrderStatus::Cancelled,
                action: OrderAction::Accept,
                actor: Actor::Seller
            }
        ));
    }

    #[test]
    fn test_revision_cycle_then_complete() {
        let order = step(&pending_order(), OrderAction::Accept, Actor::Seller).unwrap();
        let order = step(&order, OrderAction::RequestRevision, Actor::Buyer).unwrap();
        assert_eq!(order.status(), OrderStatus::Revision);
        let order = step(&order, OrderAction::Resubmit, Actor::Buyer).unwrap();
        assert_eq!(order.status(), OrderStatus::InProgress);
        let order = step(&order, OrderAction::Complete, Actor::Seller).unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
        assert!(order.completed_at().is_some());
        assert_eq!(order.version(), 4);
    }

    #[test]
    fn test_revision_notifies_counterpart() {
        let t = resolve(
            OrderStatus::InProgress,
            OrderAction::RequestRevision,
            Actor::Seller,
            Money::ZERO,
        )
        .unwrap();
        assert_eq!(
            t.side_effect,
            SideEffect::Notify {
                recipient: Actor::Buyer,
                notice: Notice::RevisionRequested
            }
        );
    }

    #[test]
    fn test_completion_releases_order_total() {
        let order = step(&pending_order(), OrderAction::Accept, Actor::Seller).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 12, 9, 0, 0).unwrap();
        let (_, event) = apply(&order, OrderAction::Complete, Actor::Seller, at).unwrap();
        assert_eq!(
            event.side_effect,
            SideEffect::ReleasePayment {
                amount: Money::from_minor(25_000)
            }
        );
    }

    #[test]
    fn test_delivery_date_survives_transitions() {
        let order = pending_order();
        let order2 = step(&order, OrderAction::Accept, Actor::Seller).unwrap();
        let order3 = step(&order2, OrderAction::RequestRevision, Actor::Seller).unwrap();
        assert_eq!(order3.delivery_date, order.delivery_date);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for action in OrderAction::ALL {
                for actor in [Actor::Buyer, Actor::Seller] {
                    assert!(!is_allowed(status, action, actor));
                }
            }
        }
    }

    #[test]
    fn test_buyer_cannot_accept_or_complete() {
        assert!(!is_allowed(OrderStatus::Pending, OrderAction::Accept, Actor::Buyer));
        assert!(!is_allowed(OrderStatus::InProgress, OrderAction::Complete, Actor::Buyer));
        assert!(!is_allowed(OrderStatus::Revision, OrderAction::Resubmit, Actor::Seller));
    }

    #[test]
    fn test_available_actions() {
        assert_eq!(
            available_actions(OrderStatus::Pending, Actor::Seller),
            vec![OrderAction::Accept, OrderAction::Reject]
        );
        assert_eq!(
            available_actions(OrderStatus::Revision, Actor::Buyer),
            vec![OrderAction::Resubmit]
        );
        assert!(available_actions(OrderStatus::Pending, Actor::Buyer).is_empty());
    }

    #[test]
    fn test_failed_action_leaves_order_untouched() {
        let order = pending_order();
        let before = order.clone();
        assert!(step(&order, OrderAction::Complete, Actor::Seller).is_err());
        assert_eq!(order, before);
    }
}
