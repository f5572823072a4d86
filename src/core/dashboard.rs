use crate::domain::model::{Money, Order, OrderStatus};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub monthly_earnings: Money,
    pub completed_projects: u32,
    pub pending_projects: u32,
    /// in_progress + revision
    pub active_projects: u32,
    /// Passed through from the creator record, not derived from orders.
    pub average_rating: f64,
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// 賣家儀表板統計。沒有訂單時全部為零。
pub fn aggregate(
    orders: &[Order],
    seller_id: &str,
    seller_rating: f64,
    now: DateTime<Utc>,
) -> DashboardStats {
    let mut stats = DashboardStats {
        average_rating: seller_rating,
        ..DashboardStats::default()
    };

    for order in orders.iter().filter(|o| o.seller_id == seller_id) {
        match order.status() {
            OrderStatus::Pending => stats.pending_projects += 1,
            OrderStatus::InProgress | OrderStatus::Revision => stats.active_projects += 1,
            OrderStatus::Completed => {
                stats.completed_projects += 1;
                if order.completed_at().is_some_and(|at| same_month(at, now)) {
                    stats.monthly_earnings = stats.monthly_earnings.saturating_add(order.total_price);
                }
            }
            OrderStatus::Cancelled => {}
        }
    }

    stats
}

/// The seller's work queue, each list in input order.
#[derive(Debug, Default, Serialize)]
pub struct SellerQueue<'a> {
    pub pending: Vec<&'a Order>,
    pub active: Vec<&'a Order>,
    pub completed: Vec<&'a Order>,
}

pub fn seller_queue<'a>(orders: &'a [Order], seller_id: &str) -> SellerQueue<'a> {
    let mut queue = SellerQueue::default();
    for order in orders.iter().filter(|o| o.seller_id == seller_id) {
        match order.status() {
            OrderStatus::Pending => queue.pending.push(order),
            OrderStatus::InProgress | OrderStatus::Revision => queue.active.push(order),
            OrderStatus::Completed => queue.completed.push(order),
            OrderStatus::Cancelled => {}
        }
    }
    queue
}
