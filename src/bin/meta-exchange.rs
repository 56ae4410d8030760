// Meta Exchange - CLI
// Plans market orders across exchanges, from the console or over HTTP

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{error, info, Level};
use meta_exchange::core::OrderType;
use meta_exchange::{Config, MetaExchangeResult};

// Load command modules from cli directory
#[path = "../cli/plan_commands.rs"]
mod plan_commands;
#[path = "../cli/server_commands.rs"]
mod server_commands;

#[derive(Parser)]
#[command(name = "meta-exchange")]
#[command(version = "0.2.0")]
#[command(about = "Best-price market order planner across exchanges", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file and the seeded balance database
    Init,

    /// Plan a market order and print it
    Plan {
        /// buy or sell
        side: OrderType,

        /// Amount of BTC
        amount: Decimal,

        /// Order book file (overrides [order_books] path)
        #[arg(short, long)]
        order_books: Option<String>,
    },

    /// List stored exchange balances
    Exchanges,

    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides [server] bind_address)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A broken config is reported after logging is up
    let loaded = load_config(&cli.config);
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        loaded
            .as_ref()
            .ok()
            .and_then(|config| config.logging.level.parse().ok())
            .unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(e) = run(cli, loaded).await {
        error!("❌ {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, loaded: MetaExchangeResult<Config>) -> MetaExchangeResult<()> {
    match cli.command {
        // Init doesn't require config (it creates it)
        Commands::Init => plan_commands::init_workspace(&cli.config),

        Commands::Plan {
            side,
            amount,
            order_books,
        } => plan_commands::plan_order(side, amount, order_books.as_deref(), &loaded?),

        Commands::Exchanges => plan_commands::list_exchanges(&loaded?),

        Commands::Serve { bind } => {
            let config = loaded?;
            info!("🚀 Meta Exchange v0.2.0");
            info!("📁 Config: {}", cli.config);
            server_commands::start_server(bind.as_deref(), &config).await
        }
    }
}

/// Missing config file means defaults; anything else wrong with it is an error
fn load_config(path: &str) -> MetaExchangeResult<Config> {
    if Path::new(path).exists() {
        Ok(Config::from_file(path)?)
    } else {
        Ok(Config::default())
    }
}
