use crate::core::listing::{ListingQuery, PriceBand};
use crate::domain::model::{Actor, Category, Money, OrderAction};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "service-market")]
#[command(about = "Browse service listings, move orders through their lifecycle and read seller dashboards")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Seed JSON file, overrides data.seed_path
    #[arg(long)]
    pub seed: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Do not write changes back to the seed file
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List services matching the filters
    Search(SearchArgs),
    /// Show one service
    Show { service_id: String },
    /// Place an order for one package of a service
    Checkout(CheckoutArgs),
    /// Apply a buyer or seller action to an order
    Order {
        order_id: String,
        /// accept | reject | request_revision | complete | resubmit
        action: String,
        /// buyer | seller
        #[arg(long = "as")]
        actor: String,
    },
    /// Seller statistics and work queue
    Dashboard { seller_id: String },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub text: Option<String>,

    /// Category slug or "all"
    #[arg(long)]
    pub category: Option<String>,

    /// Minimum price in minor units
    #[arg(long)]
    pub min_price: Option<u64>,

    /// Maximum price in minor units
    #[arg(long)]
    pub max_price: Option<u64>,

    #[arg(long)]
    pub max_days: Option<u32>,

    /// relevance | best_selling | best_rated | price_low | price_high | fastest
    #[arg(long)]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CheckoutArgs {
    pub service_id: String,
    pub package_id: String,

    #[arg(long)]
    pub buyer_id: String,

    #[arg(long)]
    pub buyer_name: String,

    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub requirements: String,

    #[arg(long)]
    pub duration: Option<String>,

    /// Contact number for the seller
    #[arg(long)]
    pub contact: Option<String>,
}

impl SearchArgs {
    /// 以設定檔預設條件為底，命令列參數覆蓋
    pub fn to_query(&self, defaults: ListingQuery) -> Result<ListingQuery> {
        let mut query = defaults;

        if let Some(text) = &self.text {
            query.text = Some(text.clone());
        }
        match self.category.as_deref() {
            None => {}
            Some("all") => query.category = None,
            Some(slug) => query.category = Some(slug.parse::<Category>()?),
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let base = query.price_band.unwrap_or(PriceBand::new(Money::ZERO, Money::from_minor(u64::MAX)));
            query.price_band = Some(PriceBand::new(
                self.min_price.map(Money::from_minor).unwrap_or(base.lo),
                self.max_price.map(Money::from_minor).unwrap_or(base.hi),
            ));
        }
        if let Some(days) = self.max_days {
            query.max_delivery_days = Some(days);
        }
        if let Some(sort) = &self.sort {
            query.sort = sort.parse()?;
        }

        Ok(query)
    }
}

pub fn parse_order_command(action: &str, actor: &str) -> Result<(OrderAction, Actor)> {
    Ok((action.parse()?, actor.parse()?))
}
