// Order book frontier
// Per-exchange cursor over pre-sorted order books (best price first)

use std::collections::HashMap;

use super::types::{BookOrder, ExchangeId, OrderBooks};

/// Lazy walk over each exchange's order book.
///
/// Books are assumed to be sorted by the source. A cursor only ever moves
/// forward, so an exchange's orders are handed out in book order.
#[derive(Debug, Clone, Default)]
pub struct OrderBookFrontier {
    books: OrderBooks,
    cursors: HashMap<ExchangeId, usize>,
}

impl OrderBookFrontier {
    pub fn new(books: OrderBooks) -> Self {
        let cursors = books.keys().map(|&id| (id, 0)).collect();
        Self { books, cursors }
    }

    /// Exchanges that have a book, in ascending id order
    pub fn exchange_ids(&self) -> impl Iterator<Item = ExchangeId> + '_ {
        self.books.keys().copied()
    }

    /// Hand out the next order of an exchange, or `None` once its book is
    /// exhausted. Unknown exchanges have no orders.
    pub fn advance(&mut self, exchange_id: ExchangeId) -> Option<BookOrder> {
        let book = self.books.get(&exchange_id)?;
        let cursor = self.cursors.entry(exchange_id).or_insert(0);
        let order = book.get(*cursor).copied()?;
        *cursor += 1;
        Some(order)
    }

    /// Number of orders not yet handed out for an exchange
    pub fn remaining(&self, exchange_id: ExchangeId) -> usize {
        let len = self.books.get(&exchange_id).map_or(0, Vec::len);
        let cursor = self.cursors.get(&exchange_id).copied().unwrap_or(0);
        len.saturating_sub(cursor)
    }
}
