//! Listing query engine.
//!
//! `query` is a pure function of a catalog snapshot and a [`ListingQuery`]:
//! filter by text, category, price band and delivery ceiling, then sort the
//! whole filtered set once. Every sort is stable, so services with equal
//! keys keep their catalog order.

use crate::core::ranking;
use crate::domain::model::{Category, Money, Service};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Relevance,
    BestSelling,
    BestRated,
    PriceLow,
    PriceHigh,
    Fastest,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::Relevance,
        SortMode::BestSelling,
        SortMode::BestRated,
        SortMode::PriceLow,
        SortMode::PriceHigh,
        SortMode::Fastest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::BestSelling => "best_selling",
            SortMode::BestRated => "best_rated",
            SortMode::PriceLow => "price_low",
            SortMode::PriceHigh => "price_high",
            SortMode::Fastest => "fastest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Relevance => "Relevance",
            SortMode::BestSelling => "Best selling",
            SortMode::BestRated => "Best rated",
            SortMode::PriceLow => "Lowest price",
            SortMode::PriceHigh => "Highest price",
            SortMode::Fastest => "Fastest delivery",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        SortMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| MarketError::validation(format!("Unknown sort mode: {}", s)))
    }
}

/// Inclusive `[lo, hi]` range matched against a service's minimum price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBand {
    pub lo: Money,
    pub hi: Money,
}

impl PriceBand {
    pub fn new(lo: Money, hi: Money) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, price: Money) -> bool {
        self.lo <= price && price <= self.hi
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Case-insensitive substring; empty or absent matches everything.
    #[serde(default)]
    pub text: Option<String>,
    /// `None` means all categories.
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub price_band: Option<PriceBand>,
    #[serde(default)]
    pub max_delivery_days: Option<u32>,
    #[serde(default)]
    pub sort: SortMode,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn in_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn priced_between(mut self, lo: Money, hi: Money) -> Self {
        self.price_band = Some(PriceBand::new(lo, hi));
        self
    }

    pub fn delivered_within(mut self, days: u32) -> Self {
        self.max_delivery_days = Some(days);
        self
    }

    pub fn sorted_by(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// True when anything beyond the text and sort narrows the result.
    pub fn has_filters(&self) -> bool {
        self.category.is_some() || self.price_band.is_some() || self.max_delivery_days.is_some()
    }

    fn matches(&self, service: &Service, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            if !text_matches(service, needle) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if service.category != category {
                return false;
            }
        }
        if let Some(band) = self.price_band {
            if !band.contains(service.min_price()) {
                return false;
            }
        }
        if let Some(max_days) = self.max_delivery_days {
            if service.min_delivery_days() > max_days {
                return false;
            }
        }
        true
    }
}

impl Validate for ListingQuery {
    fn validate(&self) -> Result<()> {
        if let Some(band) = self.price_band {
            if band.lo > band.hi {
                return Err(MarketError::validation(format!(
                    "Price range is inverted: {} > {}",
                    band.lo, band.hi
                )));
            }
        }
        Ok(())
    }
}

/// `needle` must already be lowercase.
fn text_matches(service: &Service, needle: &str) -> bool {
    service.title.to_lowercase().contains(needle)
        || service.description.to_lowercase().contains(needle)
        || service
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
        || service.creator.name.to_lowercase().contains(needle)
}

pub fn query(catalog: &[Service], params: &ListingQuery) -> Result<Vec<Service>> {
    params.validate()?;

    let needle = params
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let filtered: Vec<Service> = catalog
        .iter()
        .filter(|s| params.matches(s, needle.as_deref()))
        .cloned()
        .collect();

    Ok(sort_listings(filtered, params.sort))
}

/// `slice::sort_by_key` and `sort_by` are stable, which is what keeps ties
/// in catalog order.
pub fn sort_listings(mut services: Vec<Service>, mode: SortMode) -> Vec<Service> {
    match mode {
        SortMode::Relevance => return ranking::rank_by_relevance(services),
        SortMode::BestSelling => services.sort_by_key(|s| Reverse(s.sales_count)),
        SortMode::BestRated => {
            services.sort_by(|a, b| b.creator.rating.total_cmp(&a.creator.rating))
        }
        SortMode::PriceLow => services.sort_by_key(|s| s.min_price()),
        SortMode::PriceHigh => services.sort_by_key(|s| Reverse(s.min_price())),
        SortMode::Fastest => services.sort_by_key(|s| s.min_delivery_days()),
    }
    services
}
