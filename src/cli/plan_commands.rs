// Planning command implementations
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use meta_exchange::core::{ExecutionPlan, ExecutionPlanner, OrderType};
use meta_exchange::db::ExchangeService;
use meta_exchange::sources::OrderBookFile;
use meta_exchange::{Config, ConfigError, MarketOrderService, MetaExchangeError, MetaExchangeResult};

pub fn init_workspace(config_path: &str) -> MetaExchangeResult<()> {
    info!("🔧 Initializing workspace...");

    if !Path::new(config_path).exists() {
        let default_config = include_str!("../../config.toml.example");
        fs::write(config_path, default_config)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;
        info!("📝 Created {}", config_path);
    } else {
        warn!("⚠️  {} already exists, skipping", config_path);
    }

    let config = Config::from_file(config_path)?;
    let service = ExchangeService::open(&config.database)?;
    let count = service.list()?.len();

    info!("🗄️  Database ready at {} ({} exchanges)", config.database.path, count);
    info!("✅ Workspace initialized successfully!");
    info!("💡 Next steps:");
    info!("   1. Set [order_books] path in {}", config_path);
    info!("   2. Run: meta-exchange plan buy 1.5");

    Ok(())
}

pub fn plan_order(
    order_type: OrderType,
    amount: Decimal,
    order_books: Option<&str>,
    config: &Config,
) -> MetaExchangeResult<()> {
    if amount <= Decimal::ZERO {
        return Err(MetaExchangeError::InvalidParameter(
            "amount".to_string(),
            "must be greater than zero".to_string(),
        ));
    }

    let books = OrderBookFile::from_config(&config.order_books, order_books)?;
    let exchanges = ExchangeService::open(&config.database)?;
    info!("📖 Order books from {}", books.path().display());

    let service = MarketOrderService::new(
        Arc::new(books),
        Arc::new(exchanges),
        ExecutionPlanner::new(config.planner.tie_break),
    );
    let plan = service.place_market_order(amount, order_type)?;

    print_plan(order_type, amount, &plan);
    Ok(())
}

fn print_plan(order_type: OrderType, amount: Decimal, plan: &ExecutionPlan) {
    println!("Execution plan for {}ing {} BTC:", order_type, amount);
    for order in &plan.orders {
        println!("- Exchange {}: {:.8} BTC", order.exchange_id, order.amount);
    }
    if plan.is_partial() {
        println!("Unfilled: {:.8} BTC", plan.unfilled());
    }
}

pub fn list_exchanges(config: &Config) -> MetaExchangeResult<()> {
    let service = ExchangeService::open(&config.database)?;
    let records = service.list()?;

    if records.is_empty() {
        warn!("No exchanges stored in {}", config.database.path);
        return Ok(());
    }

    println!("{:>4}  {:>20}  {:>20}", "ID", "QUOTE (EUR)", "BASE (BTC)");
    for record in records {
        println!(
            "{:>4}  {:>20}  {:>20}",
            record.id, record.quote_balance, record.base_balance
        );
    }
    Ok(())
}
