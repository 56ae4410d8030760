// Common types shared by the planner, the data sources and the API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type ExchangeId = i32;

/// Per-exchange order books, best price first within each exchange
pub type OrderBooks = BTreeMap<ExchangeId, Vec<BookOrder>>;

/// Exchange balances keyed by exchange id
pub type Exchanges = BTreeMap<ExchangeId, Exchange>;

/// Direction of the market order being planned.
///
/// A buy is filled against asks and spends quote currency, a sell is filled
/// against bids and spends base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Buy,
    Sell,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Buy => "buy",
            OrderType::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(OrderType::Buy),
            "sell" => Ok(OrderType::Sell),
            other => Err(format!("unknown order type '{}', expected buy or sell", other)),
        }
    }
}

/// One resting order at one price level on one exchange.
///
/// Never mutated; a partially consumed order is replaced by a copy with a
/// smaller amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookOrder {
    pub amount: Decimal,
    pub price: Decimal,
    pub exchange_id: ExchangeId,
}

impl BookOrder {
    pub fn new(amount: Decimal, price: Decimal, exchange_id: ExchangeId) -> Self {
        Self { amount, price, exchange_id }
    }

    /// The same order with `filled` taken off its amount
    pub fn remainder(&self, filled: Decimal) -> Self {
        Self {
            amount: self.amount - filled,
            ..*self
        }
    }
}

/// An exchange and its balances of the two currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: ExchangeId,
    /// Pricing currency (EUR)
    pub quote_balance: Decimal,
    /// Traded asset (BTC)
    pub base_balance: Decimal,
}

impl Exchange {
    pub fn new(id: ExchangeId, quote_balance: Decimal, base_balance: Decimal) -> Self {
        Self { id, quote_balance, base_balance }
    }

    /// Balance of the currency spent by an order of this type
    pub fn spendable(&self, order_type: OrderType) -> Decimal {
        match order_type {
            OrderType::Buy => self.quote_balance,
            OrderType::Sell => self.base_balance,
        }
    }
}

/// One execution instruction: trade `amount` of base currency on an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub exchange_id: ExchangeId,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

impl Order {
    pub fn new(amount: Decimal, exchange_id: ExchangeId, order_type: OrderType) -> Self {
        Self { amount, exchange_id, order_type }
    }
}

/// Market order to plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub order_type: OrderType,
}

impl PlanRequest {
    pub fn new(amount: Decimal, order_type: OrderType) -> Self {
        Self { amount, order_type }
    }
}

/// Outcome of one planning run.
///
/// `balances` holds the balances the exchanges would have after executing
/// `orders`. Adopting them is up to the caller and only meaningful for the
/// whole plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub orders: Vec<Order>,
    pub requested: Decimal,
    pub filled: Decimal,
    pub balances: Exchanges,
}

impl ExecutionPlan {
    pub fn empty(requested: Decimal, balances: Exchanges) -> Self {
        Self {
            orders: Vec::new(),
            requested,
            filled: Decimal::ZERO,
            balances,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// True when liquidity or balances ran out before the request was filled
    pub fn is_partial(&self) -> bool {
        self.filled < self.requested
    }

    pub fn unfilled(&self) -> Decimal {
        (self.requested - self.filled).max(Decimal::ZERO)
    }
}
