use crate::utils::error::{MarketError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// 每個服務最多可上架的方案數
pub const MAX_PACKAGES_PER_SERVICE: usize = 3;

/// Currency-agnostic amount in minor units (cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    pub const fn from_major(major: u64) -> Self {
        Self(major * 100)
    }

    pub const fn minor(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ReelsEditing,
    Scriptwriting,
    PaidTraffic,
    PostEditing,
    Consulting,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ReelsEditing,
        Category::Scriptwriting,
        Category::PaidTraffic,
        Category::PostEditing,
        Category::Consulting,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::ReelsEditing => "reels-editing",
            Category::Scriptwriting => "scriptwriting",
            Category::PaidTraffic => "paid-traffic",
            Category::PostEditing => "post-editing",
            Category::Consulting => "consulting",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::ReelsEditing => "Reels editing",
            Category::Scriptwriting => "Scriptwriting",
            Category::PaidTraffic => "Paid traffic",
            Category::PostEditing => "Post editing",
            Category::Consulting => "Consulting",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| MarketError::validation(format!("Unknown category: {}", s)))
    }
}

/// Creator qualification tier, ordered `Tier1 < Tier2 < Tier3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorLevel {
    Tier1,
    Tier2,
    Tier3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// 0.0 - 5.0
    pub rating: f64,
    pub review_count: u32,
    pub level: CreatorLevel,
    pub verified: bool,
    pub completed_projects: u32,
    pub response_time: String,
}

pub const MAX_RATING: f64 = 5.0;

impl Creator {
    pub fn validate_rating(&self) -> Result<()> {
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(MarketError::validation(format!(
                "Creator '{}' has rating {} outside 0.0 - {}",
                self.id, self.rating, MAX_RATING
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePackage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub delivery_days: u32,
    pub revisions: u32,
    pub features: Vec<String>,
}

/// 檢查方案清單：1 到 3 個方案、交期為正、至少一項功能、id 不重複
pub fn validate_packages(packages: &[ServicePackage]) -> Result<()> {
    if packages.is_empty() || packages.len() > MAX_PACKAGES_PER_SERVICE {
        return Err(MarketError::validation(format!(
            "A service needs between 1 and {} packages, got {}",
            MAX_PACKAGES_PER_SERVICE,
            packages.len()
        )));
    }

    let mut seen = HashSet::new();
    for package in packages {
        if !seen.insert(package.id.as_str()) {
            return Err(MarketError::validation(format!(
                "Duplicate package id: {}",
                package.id
            )));
        }
        if package.delivery_days == 0 {
            return Err(MarketError::validation(format!(
                "Package '{}' must have a positive delivery time",
                package.name
            )));
        }
        if package.features.is_empty() {
            return Err(MarketError::validation(format!(
                "Package '{}' must list at least one feature",
                package.name
            )));
        }
    }

    Ok(())
}

/// Plain serialized form of a [`Service`]. Derived price and delivery
/// fields are not part of it; they are always computed from the packages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub creator: Creator,
    pub packages: Vec<ServicePackage>,
    #[serde(default)]
    pub portfolio: Vec<String>,
    #[serde(default)]
    pub sales_count: u32,
    #[serde(default)]
    pub interested_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A listing. The package list is private so the min/max price and
/// delivery figures can never drift from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ServiceRecord", into = "ServiceRecord")]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub creator: Creator,
    packages: Vec<ServicePackage>,
    pub portfolio: Vec<String>,
    pub sales_count: u32,
    pub interested_count: u32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ServiceRecord> for Service {
    type Error = MarketError;

    fn try_from(record: ServiceRecord) -> Result<Self> {
        validate_packages(&record.packages)?;
        record.creator.validate_rating()?;
        Ok(Self {
            id: record.id,
            title: record.title,
            description: record.description,
            category: record.category,
            creator: record.creator,
            packages: record.packages,
            portfolio: record.portfolio,
            sales_count: record.sales_count,
            interested_count: record.interested_count,
            tags: record.tags,
            created_at: record.created_at,
        })
    }
}

impl From<Service> for ServiceRecord {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            title: service.title,
            description: service.description,
            category: service.category,
            creator: service.creator,
            packages: service.packages,
            portfolio: service.portfolio,
            sales_count: service.sales_count,
            interested_count: service.interested_count,
            tags: service.tags,
            created_at: service.created_at,
        }
    }
}

impl Service {
    pub fn packages(&self) -> &[ServicePackage] {
        &self.packages
    }

    pub fn package(&self, package_id: &str) -> Option<&ServicePackage> {
        self.packages.iter().find(|p| p.id == package_id)
    }

    pub fn owned_by(&self, creator_id: &str) -> bool {
        self.creator.id == creator_id
    }

    pub fn min_price(&self) -> Money {
        self.packages.iter().map(|p| p.price).min().unwrap_or(Money::ZERO)
    }

    pub fn max_price(&self) -> Money {
        self.packages.iter().map(|p| p.price).max().unwrap_or(Money::ZERO)
    }

    /// 平均價格（取整數最小單位，向下取整）
    pub fn average_price(&self) -> Money {
        let total: u64 = self.packages.iter().map(|p| p.price.minor()).sum();
        Money::from_minor(total / self.packages.len().max(1) as u64)
    }

    pub fn min_delivery_days(&self) -> u32 {
        self.packages
            .iter()
            .map(|p| p.delivery_days)
            .min()
            .unwrap_or(0)
    }

    /// Swaps the whole package list. Rejected lists leave the service untouched.
    pub fn replace_packages(&mut self, packages: Vec<ServicePackage>) -> Result<()> {
        validate_packages(&packages)?;
        self.packages = packages;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Revision,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Revision,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Position on the tracking track `pending -> in_progress -> revision -> completed`.
    pub fn progress_step(self) -> Option<usize> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::InProgress => Some(1),
            OrderStatus::Revision => Some(2),
            OrderStatus::Completed => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Revision => "revision",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Buyer,
    Seller,
}

impl Actor {
    pub fn counterpart(self) -> Actor {
        match self {
            Actor::Buyer => Actor::Seller,
            Actor::Seller => Actor::Buyer,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Buyer => f.write_str("buyer"),
            Actor::Seller => f.write_str("seller"),
        }
    }
}

impl FromStr for Actor {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buyer" => Ok(Actor::Buyer),
            "seller" => Ok(Actor::Seller),
            other => Err(MarketError::validation(format!("Unknown actor: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Accept,
    Reject,
    RequestRevision,
    Complete,
    Resubmit,
}

impl OrderAction {
    pub const ALL: [OrderAction; 5] = [
        OrderAction::Accept,
        OrderAction::Reject,
        OrderAction::RequestRevision,
        OrderAction::Complete,
        OrderAction::Resubmit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderAction::Accept => "accept",
            OrderAction::Reject => "reject",
            OrderAction::RequestRevision => "request_revision",
            OrderAction::Complete => "complete",
            OrderAction::Resubmit => "resubmit",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            OrderAction::Accept => "accepted",
            OrderAction::Reject => "rejected",
            OrderAction::RequestRevision => "sent back for revision",
            OrderAction::Complete => "completed",
            OrderAction::Resubmit => "resubmitted",
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderAction {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        OrderAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| MarketError::validation(format!("Unknown order action: {}", s)))
    }
}

/// A purchase of one package. Status, version and completion time only
/// move through the order lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub service_id: String,
    pub seller_id: String,
    pub package: ServicePackage,
    pub buyer: Buyer,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub requirements: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    status: OrderStatus,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    version: u64,
}

/// Free-text fields a buyer fills in at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub description: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub requirements: String,
    #[serde(default)]
    pub contact: Option<String>,
}

impl Order {
    /// 建立待處理訂單；價格與交期在此刻由方案複製而來
    pub(crate) fn open(
        id: String,
        service: &Service,
        package: &ServicePackage,
        buyer: Buyer,
        details: OrderDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            service_id: service.id.clone(),
            seller_id: service.creator.id.clone(),
            total_price: package.price,
            delivery_date: created_at + Duration::days(i64::from(package.delivery_days)),
            package: package.clone(),
            buyer,
            description: details.description,
            duration: details.duration,
            requirements: details.requirements,
            contact: details.contact,
            status: OrderStatus::Pending,
            created_at,
            completed_at: None,
            version: 0,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub(crate) fn advance(&mut self, to: OrderStatus, at: DateTime<Utc>) {
        self.status = to;
        self.version += 1;
        if to == OrderStatus::Completed {
            self.completed_at = Some(at);
        }
    }
}
