// Configuration management for the meta exchange

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::core::queue::TieBreak;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Exchanges created when the balance table is empty
    #[serde(default = "default_seed_exchange_count")]
    pub seed_exchange_count: u32,
    #[serde(default = "default_seed_quote_balance")]
    pub seed_quote_balance: Decimal,
    #[serde(default = "default_seed_base_balance")]
    pub seed_base_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookConfig {
    /// Snapshot file, one `<unix time>\t<json>` order book per line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Every n-th line is read as the book of the next exchange
    #[serde(default = "default_sample_every")]
    pub sample_every: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub tie_break: TieBreak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Requests allowed to wait while a plan is being computed
    #[serde(default = "default_queue_limit")]
    pub queue_limit: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub order_books: OrderBookConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default value functions
fn default_db_path() -> String { "data/meta_exchange.db".to_string() }
fn default_seed_exchange_count() -> u32 { 31 }
fn default_seed_quote_balance() -> Decimal { Decimal::new(10000, 0) }
fn default_seed_base_balance() -> Decimal { Decimal::new(10, 0) }
fn default_sample_every() -> usize { 100 }
fn default_bind_address() -> String { "127.0.0.1:8080".to_string() }
fn default_queue_limit() -> usize { 100 }
fn default_request_timeout_ms() -> u64 { 30_000 }
fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            seed_exchange_count: default_seed_exchange_count(),
            seed_quote_balance: default_seed_quote_balance(),
            seed_base_balance: default_seed_base_balance(),
        }
    }
}

impl Default for OrderBookConfig {
    fn default() -> Self {
        Self {
            path: None,
            sample_every: default_sample_every(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            queue_limit: default_queue_limit(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            info!("📁 Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Validation("database.path must not be empty".to_string()));
        }

        if self.database.seed_quote_balance < Decimal::ZERO
            || self.database.seed_base_balance < Decimal::ZERO
        {
            return Err(ConfigError::Validation("seed balances must be non-negative".to_string()));
        }

        if self.order_books.sample_every == 0 {
            return Err(ConfigError::Validation("sample_every must be greater than 0".to_string()));
        }

        if self.server.queue_limit == 0 {
            return Err(ConfigError::Validation("queue_limit must be greater than 0".to_string()));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::Validation("request_timeout_ms must be greater than 0".to_string()));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}', expected one of {:?}",
                self.logging.level, LOG_LEVELS
            )));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
