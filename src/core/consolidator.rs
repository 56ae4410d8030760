// Plan consolidation
// Merges the raw fills of a run into one instruction per exchange

use std::collections::HashMap;

use super::types::{ExchangeId, Order};

/// Sum fills per exchange. Exchanges keep the position of their first fill.
pub fn consolidate(fills: &[Order]) -> Vec<Order> {
    let mut positions: HashMap<ExchangeId, usize> = HashMap::new();
    let mut orders: Vec<Order> = Vec::new();

    for fill in fills {
        match positions.get(&fill.exchange_id) {
            Some(&index) => orders[index].amount += fill.amount,
            None => {
                positions.insert(fill.exchange_id, orders.len());
                orders.push(*fill);
            }
        }
    }

    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::OrderType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_merges_fills_per_exchange() {
        let fills = vec![
            Order::new(dec!(0.1), 3, OrderType::Sell),
            Order::new(dec!(0.2), 1, OrderType::Sell),
            Order::new(dec!(0.3), 3, OrderType::Sell),
            Order::new(dec!(0.4), 1, OrderType::Sell),
        ];

        let orders = consolidate(&fills);
        assert_eq!(
            orders,
            vec![
                Order::new(dec!(0.4), 3, OrderType::Sell),
                Order::new(dec!(0.6), 1, OrderType::Sell),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(consolidate(&[]).is_empty());
    }
}
