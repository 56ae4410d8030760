//! Error handling for the meta exchange
//!
//! `PlanError` is what the planner itself can reject a run with.
//! `MetaExchangeError` wraps it together with everything the surrounding
//! layers (config, database, order book files, admission) can fail with.

use rust_decimal::Decimal;
use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::types::ExchangeId;

/// Rejection of a planning run.
///
/// Running out of liquidity or balance is not an error; these are either
/// invalid input or a snapshot the planner cannot trust.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Invalid amount {0}: amount must not be negative")]
    InvalidAmount(Decimal),

    #[error("Exchange {0} has orders but no balances")]
    UnknownExchange(ExchangeId),

    #[error("Snapshot entry {key} holds data for exchange {id}")]
    MismatchedExchangeId { key: ExchangeId, id: ExchangeId },

    #[error("Exchange {0} starts with a negative balance")]
    NegativeBalance(ExchangeId),

    #[error("Exchange {exchange_id} has an order priced at {price}")]
    InvalidPrice { exchange_id: ExchangeId, price: Decimal },

    #[error("Arithmetic overflow while filling on exchange {0}")]
    ArithmeticOverflow(ExchangeId),

    #[error("Fill would overdraw exchange {0}")]
    Overdraft(ExchangeId),
}

impl PlanError {
    /// True for caller mistakes, false for inconsistent snapshots
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PlanError::InvalidAmount(_))
    }
}

/// Main error type for the meta exchange
#[derive(Debug, Error)]
pub enum MetaExchangeError {
    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    // Order book file errors
    #[error("Order book file not found: {0}")]
    OrderBookFileNotFound(String),

    #[error("Order book file is not configured")]
    OrderBookFileMissing,

    #[error("Failed to parse order book on line {line}: {message}")]
    OrderBookParse { line: usize, message: String },

    #[error("File read error: {0}")]
    FileRead(String),

    // Request errors
    #[error("Invalid parameter '{0}': {1}")]
    InvalidParameter(String, String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    // Admission errors
    #[error("Too many pending requests ({0} queued)")]
    QueueFull(usize),

    #[error("Planning did not finish within {0} ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MetaExchangeError {
    /// Get a user-friendly error message with a hint on how to fix it
    pub fn user_message(&self) -> String {
        match self {
            MetaExchangeError::OrderBookFileNotFound(path) => {
                format!(
                    "Order book file not found: {}\n\n\
                    💡 Pass an existing file with --order-books or set\n\
                    [order_books] path in the config file",
                    path
                )
            }
            MetaExchangeError::OrderBookFileMissing => {
                "No order book file configured\n\n\
                💡 Pass one with --order-books or set [order_books] path"
                    .to_string()
            }
            MetaExchangeError::Database(msg) | MetaExchangeError::Migration(msg) => {
                format!(
                    "Database error: {}\n\n\
                    💡 Try:\n\
                    1. Run: meta-exchange init\n\
                    2. Check the database path in the config file",
                    msg
                )
            }
            MetaExchangeError::Plan(err) if !err.is_invalid_input() => {
                format!(
                    "The order books and balances do not match: {}\n\n\
                    💡 Make sure every exchange in the order book file has a\n\
                    balance row (see: meta-exchange exchanges)",
                    err
                )
            }
            MetaExchangeError::QueueFull(_) => {
                format!("{}\n\n💡 Please wait before retrying", self)
            }
            _ => self.to_string(),
        }
    }

    /// Check if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MetaExchangeError::QueueFull(_) | MetaExchangeError::Timeout(_)
        )
    }

    /// Get error category for logging and API responses
    pub fn category(&self) -> &'static str {
        match self {
            MetaExchangeError::Config(_) => "config",

            MetaExchangeError::Database(_) | MetaExchangeError::Migration(_) => "database",

            MetaExchangeError::OrderBookFileNotFound(_)
            | MetaExchangeError::OrderBookFileMissing
            | MetaExchangeError::OrderBookParse { .. }
            | MetaExchangeError::FileRead(_) => "order_books",

            MetaExchangeError::InvalidParameter(_, _) => "validation",
            MetaExchangeError::Plan(err) if err.is_invalid_input() => "validation",
            MetaExchangeError::Plan(_) => "snapshot",

            MetaExchangeError::QueueFull(_) | MetaExchangeError::Timeout(_) => "admission",

            MetaExchangeError::Internal(_) => "internal",
        }
    }
}

impl From<io::Error> for MetaExchangeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => MetaExchangeError::OrderBookFileNotFound(err.to_string()),
            _ => MetaExchangeError::FileRead(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for MetaExchangeError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => MetaExchangeError::Database(msg),
            rusqlite::Error::QueryReturnedNoRows => {
                MetaExchangeError::Database("Query returned no rows".to_string())
            }
            _ => MetaExchangeError::Database(err.to_string()),
        }
    }
}

impl From<refinery::Error> for MetaExchangeError {
    fn from(err: refinery::Error) -> Self {
        MetaExchangeError::Migration(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MetaExchangeError {
    fn from(err: tokio::task::JoinError) -> Self {
        MetaExchangeError::Internal(format!("Planning task failed: {}", err))
    }
}

/// Result type alias using MetaExchangeError
pub type MetaExchangeResult<T> = Result<T, MetaExchangeError>;
