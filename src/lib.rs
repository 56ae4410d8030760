// Meta Exchange Library
//
// Plans a market order across several exchanges for the best overall price,
// respecting each exchange's balances

pub mod core;
pub mod config;
pub mod error;    // Unified error handling
pub mod sources;  // Order book and balance snapshots
pub mod db;       // SQLite balance store
pub mod service;
pub mod api;      // HTTP entry point

// Re-export core planning types
pub use crate::core::{
    BookOrder, Exchange, ExchangeId, Exchanges, ExecutionPlan, ExecutionPlanner, Order,
    OrderBooks, OrderType, PlanRequest, TieBreak,
};

// Re-export error types
pub use error::{MetaExchangeError, MetaExchangeResult, PlanError};

// Re-export configuration
pub use config::{Config, ConfigError};

// Re-export sources and services
pub use sources::{ExchangeSource, InMemorySnapshot, OrderBookFile, OrderBookSource};
pub use db::{Database, ExchangeRecord, ExchangeService};
pub use service::MarketOrderService;
