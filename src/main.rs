use clap::Parser;
use serde_json::json;
use service_market::adapters::seed::Seed;
use service_market::adapters::{FanoutSink, TracingSink, WebhookDispatcher};
use service_market::config::cli::{parse_order_command, Command};
use service_market::core::dashboard::seller_queue;
use service_market::core::lifecycle::available_actions;
use service_market::domain::model::{Actor, Buyer, OrderDetails};
use service_market::domain::ports::{EventSink, OrderRepository};
use service_market::utils::error::ErrorCategory;
use service_market::utils::{logger, validation::Validate};
use service_market::{CliConfig, InMemoryCatalog, InMemoryOrderStore, Marketplace, TomlConfig};
use std::sync::Arc;

type Market = Marketplace<InMemoryCatalog, InMemoryOrderStore>;

async fn execute(market: &Market, config: &TomlConfig, command: &Command) -> service_market::Result<serde_json::Value> {
    match command {
        Command::Search(args) => {
            let query = args.to_query(config.default_query())?;
            let results = market.search(&query, None).await?;
            tracing::info!("🔍 {} service(s) matched", results.len());
            let rows: Vec<_> = results
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "title": s.title,
                        "category": s.category,
                        "creator": s.creator.name,
                        "rating": s.creator.rating,
                        "min_price": s.min_price(),
                        "max_price": s.max_price(),
                        "min_delivery_days": s.min_delivery_days(),
                        "sales_count": s.sales_count,
                    })
                })
                .collect();
            Ok(json!({ "sort": query.sort, "results": rows }))
        }
        Command::Show { service_id } => {
            let service = market.view_service(service_id, None).await?;
            Ok(serde_json::to_value(&service)?)
        }
        Command::Checkout(args) => {
            let order = market
                .checkout(
                    &args.service_id,
                    &args.package_id,
                    Buyer {
                        id: args.buyer_id.clone(),
                        name: args.buyer_name.clone(),
                        avatar: None,
                    },
                    OrderDetails {
                        description: args.description.clone(),
                        duration: args.duration.clone(),
                        requirements: args.requirements.clone(),
                        contact: args.contact.clone(),
                    },
                )
                .await?;
            tracing::info!("🛒 Order {} placed", order.id);
            Ok(serde_json::to_value(&order)?)
        }
        Command::Order {
            order_id,
            action,
            actor,
        } => {
            let (action, actor) = parse_order_command(action, actor)?;
            let event = market.act(order_id, action, actor).await?;
            tracing::info!("✅ Order {} is now {}", event.order_id, event.to_status);
            Ok(json!({
                "transition": event,
                "next_actions": {
                    "buyer": available_actions(event.to_status, Actor::Buyer),
                    "seller": available_actions(event.to_status, Actor::Seller),
                },
            }))
        }
        Command::Dashboard { seller_id } => {
            let stats = market.dashboard(seller_id).await?;
            let orders = market.orders().snapshot().await?;
            let queue = seller_queue(&orders, seller_id);
            Ok(json!({ "stats": stats, "queue": queue }))
        }
    }
}

fn exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Input | ErrorCategory::Lookup => 2,
        ErrorCategory::State => 3,
        ErrorCategory::Configuration => 4,
        ErrorCategory::System => 1,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置（未指定時使用預設值）
    let mut config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(exit_code(e.category()));
            }
        },
        None => TomlConfig::default(),
    };
    if let Some(seed) = &cli.seed {
        config.data.seed_path = seed.clone();
    }

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(cli.verbose, config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, config.logging.level.as_deref());
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(e.category()));
    }

    let seed_path = config.data.seed_path.clone();
    tracing::info!("📁 Loading marketplace data from: {}", seed_path);
    let (catalog, orders) = Seed::from_file(&seed_path)?.into_stores()?;

    let mut dispatcher = None;
    let sink: Arc<dyn EventSink> = match config.webhook_settings() {
        Some(settings) => {
            let (webhook, handle) = WebhookDispatcher::spawn(settings)?;
            dispatcher = Some(handle);
            // 同時寫入日誌，webhook 失敗時仍有紀錄
            Arc::new(FanoutSink::new(vec![Arc::new(webhook), Arc::new(TracingSink)]))
        }
        None => Arc::new(TracingSink),
    };

    let market = Marketplace::new(catalog, orders, sink);
    let outcome = execute(&market, &config, &cli.command).await;

    let mutating = matches!(cli.command, Command::Checkout(_) | Command::Order { .. });
    if outcome.is_ok() && mutating && !cli.dry_run {
        Seed::capture(market.catalog(), market.orders())
            .await?
            .write_to(&seed_path)?;
        tracing::info!("💾 Saved changes to {}", seed_path);
    }

    // 關閉事件佇列並等待送出
    drop(market);
    if let Some(handle) = dispatcher {
        let report = handle.await?;
        tracing::info!(
            "📣 Webhook: {} delivered, {} failed",
            report.delivered,
            report.failed
        );
    }

    match outcome {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?})",
                e,
                e.category()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.category()));
        }
    }
}
