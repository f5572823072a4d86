use crate::domain::model::{Buyer, Order, OrderDetails, Service};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{require_text, Validate};
use chrono::{DateTime, Utc};

impl Validate for OrderDetails {
    fn validate(&self) -> Result<()> {
        require_text("description", &self.description)?;
        require_text("requirements", &self.requirements)?;
        Ok(())
    }
}

/// 由買家結帳建立訂單
///
/// The package must be one of `service`'s packages. Price and delivery date
/// are copied from it now; later package edits do not reach this order.
pub fn place_order(
    order_id: String,
    service: &Service,
    package_id: &str,
    buyer: Buyer,
    details: OrderDetails,
    now: DateTime<Utc>,
) -> Result<Order> {
    details.validate()?;
    require_text("buyer id", &buyer.id)?;

    let package = service.package(package_id).ok_or_else(|| {
        MarketError::validation(format!(
            "Package '{}' does not belong to service '{}'",
            package_id, service.id
        ))
    })?;

    Ok(Order::open(order_id, service, package, buyer, details, now))
}

/// Checks an order loaded from storage against the service it claims.
pub fn verify_order_package(order: &Order, service: &Service) -> Result<()> {
    if order.service_id != service.id || service.package(&order.package.id).is_none() {
        return Err(MarketError::validation(format!(
            "Order '{}' references package '{}' which does not belong to service '{}'",
            order.id, order.package.id, order.service_id
        )));
    }
    if order.seller_id != service.creator.id {
        return Err(MarketError::validation(format!(
            "Order '{}' names seller '{}' but service '{}' belongs to '{}'",
            order.id, order.seller_id, service.id, service.creator.id
        )));
    }
    Ok(())
}
