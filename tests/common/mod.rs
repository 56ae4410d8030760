// Common test utilities and helpers
#![allow(dead_code)]

use meta_exchange::{
    BookOrder, Exchange, ExchangeId, Exchanges, ExecutionPlanner, InMemorySnapshot,
    MarketOrderService, OrderBooks,
};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary directory for test databases
pub fn create_temp_db_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    (temp_dir, db_path)
}

/// Exchange balances from `(id, quote, base)` tuples
pub fn exchanges(list: &[(ExchangeId, Decimal, Decimal)]) -> Exchanges {
    list.iter()
        .map(|&(id, quote, base)| (id, Exchange::new(id, quote, base)))
        .collect()
}

/// Order books from `(id, [(amount, price)])`, levels in the given order
pub fn books(list: &[(ExchangeId, &[(Decimal, Decimal)])]) -> OrderBooks {
    list.iter()
        .map(|&(id, levels)| {
            let orders = levels
                .iter()
                .map(|&(amount, price)| BookOrder::new(amount, price, id))
                .collect();
            (id, orders)
        })
        .collect()
}

/// Service over a fixed in-memory snapshot
pub fn snapshot_service(
    bids: OrderBooks,
    asks: OrderBooks,
    exchanges: Exchanges,
) -> MarketOrderService {
    let snapshot = Arc::new(InMemorySnapshot::new(bids, asks, exchanges));
    MarketOrderService::new(snapshot.clone(), snapshot, ExecutionPlanner::default())
}

/// One recorded order book line: `<unix time>\t<json>`
pub fn book_line(bids: &[(&str, &str)], asks: &[(&str, &str)]) -> String {
    fn side(kind: &str, levels: &[(&str, &str)]) -> String {
        levels
            .iter()
            .map(|(amount, price)| {
                format!(
                    r#"{{"Order":{{"Id":null,"Time":"0001-01-01T00:00:00","Type":"{}","Kind":"Limit","Amount":{},"Price":{}}}}}"#,
                    kind, amount, price
                )
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    format!(
        "1548759600.25189\t{{\"AcqTime\":\"2019-01-29T11:00:00.2518854Z\",\"Bids\":[{}],\"Asks\":[{}]}}",
        side("Buy", bids),
        side("Sell", asks)
    )
}

/// Write order book lines to `<dir>/order_books_data`
pub fn write_order_book_file(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join("order_books_data");
    fs::write(&path, lines.join("\n")).expect("Failed to write order book file");
    path
}
