// Priority frontier queue
// Global best-first set of candidate orders, at most one per exchange

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use super::types::{BookOrder, Exchange, ExchangeId, OrderType};

/// How candidates at the same price are ordered.
///
/// Either way, remaining ties go to the candidate that was queued first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Price only
    #[default]
    PriceOnly,
    /// Prefer the exchange holding more of the currency it would spend
    LargestBalance,
}

/// Heap key, larger is better. Buy prices are negated so the lowest ask
/// sorts highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Priority {
    price: Decimal,
    balance: Decimal,
    arrival: Reverse<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    priority: Priority,
    order: BookOrder,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority)
    }
}

/// Best-first queue over the exchanges' current frontier orders.
///
/// Selling takes the highest bid first, buying the lowest ask first.
#[derive(Debug)]
pub struct FrontierQueue {
    order_type: OrderType,
    tie_break: TieBreak,
    heap: BinaryHeap<Candidate>,
    live: HashSet<ExchangeId>,
    arrivals: u64,
}

impl FrontierQueue {
    pub fn new(order_type: OrderType, tie_break: TieBreak) -> Self {
        Self {
            order_type,
            tie_break,
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            arrivals: 0,
        }
    }

    /// Queue an order with a key computed from the owning exchange's
    /// current balances. The exchange must not already have a live
    /// candidate.
    pub fn push(&mut self, order: BookOrder, exchange: &Exchange) {
        debug_assert_eq!(order.exchange_id, exchange.id);
        let inserted = self.live.insert(order.exchange_id);
        debug_assert!(inserted, "exchange {} queued twice", order.exchange_id);

        let price = match self.order_type {
            OrderType::Buy => -order.price,
            OrderType::Sell => order.price,
        };
        let balance = match self.tie_break {
            TieBreak::PriceOnly => Decimal::ZERO,
            TieBreak::LargestBalance => exchange.spendable(self.order_type),
        };

        self.arrivals += 1;
        self.heap.push(Candidate {
            priority: Priority {
                price,
                balance,
                arrival: Reverse(self.arrivals),
            },
            order,
        });
    }

    /// Remove and return the best candidate
    pub fn pop_best(&mut self) -> Option<BookOrder> {
        let candidate = self.heap.pop()?;
        self.live.remove(&candidate.order.exchange_id);
        Some(candidate.order)
    }

    pub fn contains(&self, exchange_id: ExchangeId) -> bool {
        self.live.contains(&exchange_id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
