use crate::domain::model::{Actor, Category, Money, OrderAction, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    Accepted,
    RefundIssued,
    RevisionRequested,
    Resubmitted,
}

/// What a collaborator has to do after a committed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideEffect {
    Notify { recipient: Actor, notice: Notice },
    ReleasePayment { amount: Money },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub order_id: String,
    pub action: OrderAction,
    pub actor: Actor,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub side_effect: SideEffect,
}

/// Everything the marketplace reports outward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum MarketEvent {
    ServiceView {
        service_id: String,
    },
    ServiceInterest {
        service_id: String,
    },
    Search {
        query: String,
        results_count: usize,
    },
    FilterApplied {
        filters: serde_json::Value,
    },
    CheckoutStarted {
        service_id: String,
        package_id: String,
    },
    OrderCreated {
        order_id: String,
        service_id: String,
        package_id: String,
        amount: Money,
    },
    ServiceCreated {
        service_id: String,
        title: String,
        category: Category,
    },
    OrderTransition(TransitionEvent),
}

impl MarketEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::ServiceView { .. } => "service_view",
            MarketEvent::ServiceInterest { .. } => "service_interest",
            MarketEvent::Search { .. } => "search",
            MarketEvent::FilterApplied { .. } => "filter_applied",
            MarketEvent::CheckoutStarted { .. } => "checkout_started",
            MarketEvent::OrderCreated { .. } => "order_created",
            MarketEvent::ServiceCreated { .. } => "service_created",
            MarketEvent::OrderTransition(_) => "order_transition",
        }
    }
}

/// Webhook payload: `{event, data, timestamp, userId}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    pub event: MarketEvent,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EventEnvelope {
    pub fn new(event: MarketEvent, timestamp: DateTime<Utc>, user_id: Option<String>) -> Self {
        Self {
            event,
            timestamp,
            user_id,
        }
    }

    pub fn name(&self) -> &'static str {
        self.event.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_envelope_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let envelope = EventEnvelope::new(
            MarketEvent::Search {
                query: "reels".to_string(),
                results_count: 2,
            },
            at,
            Some("u1".to_string()),
        );

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["event"], "search");
        assert_eq!(json["data"]["query"], "reels");
        assert_eq!(json["data"]["results_count"], 2);
        assert_eq!(json["userId"], "u1");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_transition_envelope_carries_statuses() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let envelope = EventEnvelope::new(
            MarketEvent::OrderTransition(TransitionEvent {
                order_id: "o1".to_string(),
                action: OrderAction::Complete,
                actor: Actor::Seller,
                from_status: OrderStatus::InProgress,
                to_status: OrderStatus::Completed,
                timestamp: at,
                side_effect: SideEffect::ReleasePayment {
                    amount: Money::from_minor(5000),
                },
            }),
            at,
            None,
        );

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(envelope.name(), "order_transition");
        assert_eq!(json["event"], "order_transition");
        assert_eq!(json["data"]["from_status"], "in_progress");
        assert_eq!(json["data"]["to_status"], "completed");
        assert_eq!(json["data"]["side_effect"]["kind"], "release_payment");
        assert_eq!(json["data"]["side_effect"]["amount"], 5000);
        assert!(json.get("userId").is_none());
    }
}
