// Order book file loader
// Reads recorded order book snapshots, one exchange per sampled line

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::OrderBookSource;
use crate::config::OrderBookConfig;
use crate::core::types::{BookOrder, ExchangeId, OrderBooks};
use crate::error::{MetaExchangeError, MetaExchangeResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOrderBook {
    #[serde(default)]
    acq_time: Option<DateTime<Utc>>,
    #[serde(default)]
    bids: Vec<RawEntry>,
    #[serde(default)]
    asks: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawEntry {
    order: RawOrder,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOrder {
    amount: Decimal,
    price: Decimal,
}

#[derive(Debug, Clone, Copy)]
enum BookSide {
    Bids,
    Asks,
}

/// Order book snapshots recorded as `<unix time>\t<json>` lines.
///
/// Every `sample_every`-th line, starting with the first, stands for one
/// exchange. Exchanges are numbered from 1 in file order. Each side is kept
/// in file order, which is best price first.
#[derive(Debug, Clone)]
pub struct OrderBookFile {
    path: PathBuf,
    sample_every: usize,
}

impl OrderBookFile {
    pub fn new<P: AsRef<Path>>(path: P, sample_every: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sample_every: sample_every.max(1),
        }
    }

    /// Build from config. `path_override` wins over the configured path.
    /// The file has to exist.
    pub fn from_config(
        config: &OrderBookConfig,
        path_override: Option<&str>,
    ) -> MetaExchangeResult<Self> {
        let path = path_override
            .map(str::to_string)
            .or_else(|| config.path.clone())
            .ok_or(MetaExchangeError::OrderBookFileMissing)?;

        if !Path::new(&path).is_file() {
            return Err(MetaExchangeError::OrderBookFileNotFound(path));
        }

        Ok(Self::new(path, config.sample_every))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self, side: BookSide) -> MetaExchangeResult<OrderBooks> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                MetaExchangeError::OrderBookFileNotFound(self.path.display().to_string())
            }
            _ => MetaExchangeError::FileRead(format!("{}: {}", self.path.display(), e)),
        })?;

        let mut books = OrderBooks::new();
        let mut exchange_id: ExchangeId = 0;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if index % self.sample_every != 0 {
                continue;
            }
            exchange_id += 1;

            let raw: RawOrderBook = serde_json::from_str(strip_timestamp(&line)).map_err(|e| {
                MetaExchangeError::OrderBookParse {
                    line: index + 1,
                    message: e.to_string(),
                }
            })?;
            if let Some(acquired) = raw.acq_time {
                debug!("Exchange {} book acquired at {}", exchange_id, acquired);
            }

            let entries = match side {
                BookSide::Bids => raw.bids,
                BookSide::Asks => raw.asks,
            };
            let orders = entries
                .into_iter()
                .map(|entry| BookOrder::new(entry.order.amount, entry.order.price, exchange_id))
                .collect();
            books.insert(exchange_id, orders);
        }

        debug!("Loaded {} {:?} books from {}", books.len(), side, self.path.display());
        Ok(books)
    }
}

impl OrderBookSource for OrderBookFile {
    fn bids(&self) -> MetaExchangeResult<OrderBooks> {
        self.load(BookSide::Bids)
    }

    fn asks(&self) -> MetaExchangeResult<OrderBooks> {
        self.load(BookSide::Asks)
    }
}

/// Drop the leading `<seconds>.<fraction>\t` of a recorded line
fn strip_timestamp(line: &str) -> &str {
    match line.split_once('\t') {
        Some((stamp, rest)) if is_unix_time(stamp) => rest,
        _ => line,
    }
}

fn is_unix_time(stamp: &str) -> bool {
    match stamp.split_once('.') {
        Some((secs, frac)) => {
            !secs.is_empty()
                && !frac.is_empty()
                && secs.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}
