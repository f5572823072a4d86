use crate::core::dashboard::{self, DashboardStats};
use crate::core::listing::{self, ListingQuery};
use crate::core::submission::{self, PackageDraft, ServiceDraft};
use crate::core::{checkout, lifecycle};
use crate::domain::events::{EventEnvelope, MarketEvent, TransitionEvent};
use crate::domain::model::{Actor, Buyer, Creator, Order, OrderAction, OrderDetails, Service};
use crate::domain::ports::{CatalogRepository, Clock, EventSink, OrderRepository, SystemClock};
use crate::utils::error::{MarketError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A compare-and-swap only loses when another transition committed in
/// between, and every commit moves the status. Re-validating against the
/// fresh status settles the race well within this bound.
const MAX_TRANSITION_ATTEMPTS: usize = 8;

/// Ties the catalog, the order store and the event sink together.
///
/// Holds no business state of its own: every call reads what it needs from
/// the repositories.
pub struct Marketplace<C: CatalogRepository, O: OrderRepository> {
    catalog: C,
    orders: O,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    sequence: AtomicU64,
}

impl<C: CatalogRepository, O: OrderRepository> Marketplace<C, O> {
    pub fn new(catalog: C, orders: O, sink: Arc<dyn EventSink>) -> Self {
        Self::with_clock(catalog, orders, sink, Arc::new(SystemClock))
    }

    pub fn with_clock(catalog: C, orders: O, sink: Arc<dyn EventSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            orders,
            sink,
            clock,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    fn emit(&self, event: MarketEvent, user_id: Option<&str>) {
        let envelope = EventEnvelope::new(event, self.clock.now(), user_id.map(str::to_string));
        self.sink.publish(envelope);
    }

    fn next_id(&self, prefix: char) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}{}-{}", prefix, self.clock.now().timestamp_millis(), seq)
    }

    pub async fn search(&self, params: &ListingQuery, user_id: Option<&str>) -> Result<Vec<Service>> {
        let snapshot = self.catalog.snapshot().await?;
        let results = listing::query(&snapshot, params)?;

        if let Some(text) = params.text.as_deref().filter(|t| !t.is_empty()) {
            self.emit(
                MarketEvent::Search {
                    query: text.to_string(),
                    results_count: results.len(),
                },
                user_id,
            );
        }
        if params.has_filters() {
            self.emit(
                MarketEvent::FilterApplied {
                    filters: serde_json::to_value(params)?,
                },
                user_id,
            );
        }

        Ok(results)
    }

    /// 首頁推薦：依熱門與信任度排序的完整目錄
    pub async fn feed(&self) -> Result<Vec<Service>> {
        let snapshot = self.catalog.snapshot().await?;
        listing::query(&snapshot, &ListingQuery::default())
    }

    pub async fn service(&self, service_id: &str) -> Result<Service> {
        self.catalog
            .find(service_id)
            .await?
            .ok_or_else(|| MarketError::not_found("service", service_id))
    }

    pub async fn view_service(&self, service_id: &str, user_id: Option<&str>) -> Result<Service> {
        let service = self.service(service_id).await?;
        self.emit(
            MarketEvent::ServiceView {
                service_id: service.id.clone(),
            },
            user_id,
        );
        Ok(service)
    }

    pub async fn register_interest(&self, service_id: &str, user_id: Option<&str>) -> Result<()> {
        let service = self.service(service_id).await?;
        self.emit(
            MarketEvent::ServiceInterest {
                service_id: service.id,
            },
            user_id,
        );
        Ok(())
    }

    pub async fn publish_service(&self, creator: Creator, draft: ServiceDraft) -> Result<Service> {
        let creator_id = creator.id.clone();
        let service = submission::build_service(self.next_id('s'), creator, draft, self.clock.now())?;
        self.catalog.insert(service.clone()).await?;

        tracing::debug!("Service {} published by {}", service.id, creator_id);
        self.emit(
            MarketEvent::ServiceCreated {
                service_id: service.id.clone(),
                title: service.title.clone(),
                category: service.category,
            },
            Some(&creator_id),
        );
        Ok(service)
    }

    pub async fn update_packages(
        &self,
        service_id: &str,
        creator_id: &str,
        packages: Vec<PackageDraft>,
    ) -> Result<Service> {
        let current = self.service(service_id).await?;
        let updated = submission::revise_packages(&current, creator_id, packages)?;
        self.catalog.replace(updated.clone()).await?;
        Ok(updated)
    }

    pub async fn checkout(
        &self,
        service_id: &str,
        package_id: &str,
        buyer: Buyer,
        details: OrderDetails,
    ) -> Result<Order> {
        let service = self.service(service_id).await?;
        let buyer_id = buyer.id.clone();
        self.emit(
            MarketEvent::CheckoutStarted {
                service_id: service.id.clone(),
                package_id: package_id.to_string(),
            },
            Some(&buyer_id),
        );

        let order = checkout::place_order(
            self.next_id('o'),
            &service,
            package_id,
            buyer,
            details,
            self.clock.now(),
        )?;
        self.orders.insert(order.clone()).await?;

        tracing::debug!("Order {} placed for service {}", order.id, service.id);
        self.emit(
            MarketEvent::OrderCreated {
                order_id: order.id.clone(),
                service_id: order.service_id.clone(),
                package_id: order.package.id.clone(),
                amount: order.total_price,
            },
            Some(&buyer_id),
        );
        Ok(order)
    }

    pub async fn order(&self, order_id: &str) -> Result<Order> {
        self.orders
            .find(order_id)
            .await?
            .ok_or_else(|| MarketError::not_found("order", order_id))
    }

    /// Runs one buyer or seller action against an order.
    ///
    /// Concurrent actions on the same order are settled by the store's
    /// version check: at most one commits per step, and a loser is
    /// re-validated against the status the winner left behind, which for
    /// conflicting actions yields `InvalidTransition`.
    pub async fn act(&self, order_id: &str, action: OrderAction, actor: Actor) -> Result<TransitionEvent> {
        for _ in 0..MAX_TRANSITION_ATTEMPTS {
            let current = self.order(order_id).await?;
            let (next, event) = lifecycle::apply(&current, action, actor, self.clock.now())?;

            if self.orders.compare_and_swap(current.version(), next).await? {
                tracing::debug!(
                    "Order {}: {} -> {} ({} by {})",
                    event.order_id,
                    event.from_status,
                    event.to_status,
                    action,
                    actor
                );
                let user_id = match actor {
                    Actor::Buyer => current.buyer.id.clone(),
                    Actor::Seller => current.seller_id.clone(),
                };
                self.emit(MarketEvent::OrderTransition(event.clone()), Some(&user_id));
                return Ok(event);
            }
        }

        let current = self.order(order_id).await?;
        Err(MarketError::InvalidTransition {
            from: current.status(),
            action,
            actor,
        })
    }

    /// 賣家儀表板；評分取自賣家在目錄中的創作者資料
    pub async fn dashboard(&self, seller_id: &str) -> Result<DashboardStats> {
        let catalog = self.catalog.snapshot().await?;
        let rating = catalog
            .iter()
            .find(|s| s.owned_by(seller_id))
            .map(|s| s.creator.rating)
            .unwrap_or(0.0);

        let orders = self.orders.snapshot().await?;
        Ok(dashboard::aggregate(&orders, seller_id, rating, self.clock.now()))
    }
}
