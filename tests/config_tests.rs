// Integration tests for configuration loading and validation

use meta_exchange::{Config, ConfigError, TieBreak};
use rust_decimal_macros::dec;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_serialization_deserialization() {
    let mut config = Config::default();
    config.order_books.path = Some("data/order_books_data".to_string());
    config.planner.tie_break = TieBreak::LargestBalance;

    let toml_string = toml::to_string(&config).expect("Failed to serialize config");
    assert!(toml_string.contains("order_books_data"));
    assert!(toml_string.contains("largest_balance"));

    let deserialized: Config = toml::from_str(&toml_string).expect("Failed to deserialize config");
    assert_eq!(deserialized.order_books.path, config.order_books.path);
    assert_eq!(deserialized.planner.tie_break, TieBreak::LargestBalance);
    assert_eq!(deserialized.database.seed_quote_balance, dec!(10000));
}

#[test]
fn test_config_file_loading() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    fs::write(
        &config_path,
        r#"
        [database]
        path = "balances.db"
        seed_exchange_count = 3
        seed_quote_balance = 2500.5

        [order_books]
        path = "books.txt"
        sample_every = 1

        [logging]
        level = "debug"
        "#,
    )
    .expect("Failed to write config file");

    let config = Config::from_file(&config_path).expect("Failed to load config");
    assert_eq!(config.database.path, "balances.db");
    assert_eq!(config.database.seed_exchange_count, 3);
    assert_eq!(config.database.seed_quote_balance, dec!(2500.5));
    assert_eq!(config.database.seed_base_balance, dec!(10));
    assert_eq!(config.order_books.path.as_deref(), Some("books.txt"));
    assert_eq!(config.order_books.sample_every, 1);
    assert_eq!(config.server.bind_address, "127.0.0.1:8080");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_example_config_is_valid() {
    let config: Config = toml::from_str(include_str!("../config.toml.example"))
        .expect("Example config should parse");
    assert!(config.validate().is_ok());
    assert_eq!(config.server.queue_limit, 100);
    assert_eq!(config.server.request_timeout_ms, 30_000);
    assert!(config.order_books.path.is_none());
}

#[test]
fn test_load_or_create_writes_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("new_config.toml");

    let config = Config::load_or_create(&config_path).expect("Failed to create config");
    assert!(config_path.exists());
    assert_eq!(config.database.seed_exchange_count, 31);

    let reloaded = Config::from_file(&config_path).expect("Failed to reload config");
    assert_eq!(reloaded.order_books.sample_every, 100);
}

#[test]
fn test_invalid_values_are_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[server]\nqueue_limit = 0\n").unwrap();
    assert!(matches!(
        Config::from_file(&config_path),
        Err(ConfigError::Validation(_))
    ));

    fs::write(&config_path, "[database]\nseed_base_balance = -1\n").unwrap();
    assert!(matches!(
        Config::from_file(&config_path),
        Err(ConfigError::Validation(_))
    ));

    fs::write(&config_path, "[planner]\ntie_break = \"coin_flip\"\n").unwrap();
    assert!(matches!(
        Config::from_file(&config_path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file() {
    let result = Config::from_file("/nonexistent/config.toml");
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}
