// Snapshot sources
// Where the planner's order books and balances come from

pub mod file_loader;

pub use file_loader::OrderBookFile;

use crate::core::types::{Exchanges, OrderBooks, OrderType};
use crate::error::MetaExchangeResult;

/// Per-exchange bids and asks, best price first.
pub trait OrderBookSource: Send + Sync {
    /// Bids, highest price first
    fn bids(&self) -> MetaExchangeResult<OrderBooks>;

    /// Asks, lowest price first
    fn asks(&self) -> MetaExchangeResult<OrderBooks>;

    /// The side a market order of `order_type` fills against
    fn books_for(&self, order_type: OrderType) -> MetaExchangeResult<OrderBooks> {
        match order_type {
            OrderType::Buy => self.asks(),
            OrderType::Sell => self.bids(),
        }
    }
}

/// Current exchange balances.
pub trait ExchangeSource: Send + Sync {
    fn exchanges(&self) -> MetaExchangeResult<Exchanges>;
}

/// A fixed snapshot held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshot {
    pub bids: OrderBooks,
    pub asks: OrderBooks,
    pub exchanges: Exchanges,
}

impl InMemorySnapshot {
    pub fn new(bids: OrderBooks, asks: OrderBooks, exchanges: Exchanges) -> Self {
        Self { bids, asks, exchanges }
    }
}

impl OrderBookSource for InMemorySnapshot {
    fn bids(&self) -> MetaExchangeResult<OrderBooks> {
        Ok(self.bids.clone())
    }

    fn asks(&self) -> MetaExchangeResult<OrderBooks> {
        Ok(self.asks.clone())
    }
}

impl ExchangeSource for InMemorySnapshot {
    fn exchanges(&self) -> MetaExchangeResult<Exchanges> {
        Ok(self.exchanges.clone())
    }
}
