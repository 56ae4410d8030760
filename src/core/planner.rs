// Execution planner
// Greedy allocation of a market order across exchanges in price priority

use rust_decimal::Decimal;
use tracing::debug;

use super::consolidator::consolidate;
use super::frontier::OrderBookFrontier;
use super::ledger::BalanceLedger;
use super::queue::{FrontierQueue, TieBreak};
use super::types::{
    BookOrder, Exchange, ExchangeId, Exchanges, ExecutionPlan, Order, OrderBooks, OrderType,
    PlanRequest,
};
use crate::error::PlanError;

/// Largest part of `want` an exchange can pay for at `price`
type CurrencyBound = fn(&Exchange, Decimal, Decimal) -> Option<Decimal>;

/// Buying is limited by quote currency. When `want` is unaffordable the
/// bound is `quote / price`, rounded down far enough that `amount * price`
/// never exceeds the quote balance.
fn quote_bound(exchange: &Exchange, price: Decimal, want: Decimal) -> Option<Decimal> {
    let quote = exchange.quote_balance;
    // An overflowing cost is above any balance
    if matches!(want.checked_mul(price), Some(cost) if cost <= quote) {
        return Some(want);
    }

    let mut bound = quote.checked_div(price)?;
    while bound > Decimal::ZERO && bound.checked_mul(price)? > quote {
        bound -= Decimal::new(1, bound.scale());
    }
    Some(bound.max(Decimal::ZERO).min(want))
}

/// Selling is limited by the base balance itself
fn base_bound(exchange: &Exchange, _price: Decimal, want: Decimal) -> Option<Decimal> {
    Some(want.min(exchange.base_balance))
}

/// Plans market orders against a snapshot of order books and balances.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionPlanner {
    tie_break: TieBreak,
}

impl ExecutionPlanner {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// Plan `request` against `books` (asks for a buy, bids for a sell).
    ///
    /// Running out of liquidity or balance is not an error: the plan simply
    /// fills less than requested. A negative amount and snapshots that
    /// reference unknown exchanges are rejected.
    pub fn plan(
        &self,
        request: PlanRequest,
        books: OrderBooks,
        exchanges: Exchanges,
    ) -> Result<ExecutionPlan, PlanError> {
        if request.amount < Decimal::ZERO {
            return Err(PlanError::InvalidAmount(request.amount));
        }
        if request.amount.is_zero() {
            return Ok(ExecutionPlan::empty(request.amount, exchanges));
        }

        let ledger = BalanceLedger::new(exchanges)?;
        let mut run = PlanRun::new(request, self.tie_break, books, ledger);
        run.seed()?;
        run.fill()?;
        Ok(run.finish())
    }
}

/// State owned by a single run. Nothing here outlives `plan`.
struct PlanRun {
    order_type: OrderType,
    requested: Decimal,
    remaining: Decimal,
    bound: CurrencyBound,
    frontier: OrderBookFrontier,
    ledger: BalanceLedger,
    queue: FrontierQueue,
    fills: Vec<Order>,
}

impl PlanRun {
    fn new(
        request: PlanRequest,
        tie_break: TieBreak,
        books: OrderBooks,
        ledger: BalanceLedger,
    ) -> Self {
        let bound: CurrencyBound = match request.order_type {
            OrderType::Buy => quote_bound,
            OrderType::Sell => base_bound,
        };

        Self {
            order_type: request.order_type,
            requested: request.amount,
            remaining: request.amount,
            bound,
            frontier: OrderBookFrontier::new(books),
            ledger,
            queue: FrontierQueue::new(request.order_type, tie_break),
            fills: Vec::new(),
        }
    }

    /// Queue the best order of every exchange
    fn seed(&mut self) -> Result<(), PlanError> {
        let ids: Vec<ExchangeId> = self.frontier.exchange_ids().collect();
        for id in ids {
            self.queue_next(id)?;
        }
        Ok(())
    }

    /// Queue the exchange's next usable order, if it has one left.
    /// Empty price levels are skipped.
    fn queue_next(&mut self, exchange_id: ExchangeId) -> Result<(), PlanError> {
        while let Some(order) = self.frontier.advance(exchange_id) {
            validate_order(exchange_id, &order)?;
            if order.amount <= Decimal::ZERO {
                continue;
            }
            let exchange = self.ledger.get(exchange_id)?;
            self.queue.push(order, exchange);
            return Ok(());
        }
        Ok(())
    }

    fn fill(&mut self) -> Result<(), PlanError> {
        while self.remaining > Decimal::ZERO {
            let Some(order) = self.queue.pop_best() else {
                debug!("Order books exhausted with {} left to fill", self.remaining);
                break;
            };
            let exchange_id = order.exchange_id;

            let exchange = self.ledger.get(exchange_id)?;
            let want = self.remaining.min(order.amount);
            let amount = (self.bound)(exchange, order.price, want)
                .ok_or(PlanError::ArithmeticOverflow(exchange_id))?;

            if amount <= Decimal::ZERO {
                // Spendable balance only changes through this exchange's own
                // fills, so it stays out for the rest of the run
                debug!("Exchange {} has no balance left, dropping it", exchange_id);
                continue;
            }

            self.ledger.apply(exchange_id, self.order_type, amount, order.price)?;
            self.fills.push(Order::new(amount, exchange_id, self.order_type));
            self.remaining -= amount;
            debug!(
                "Filled {} @ {} on exchange {}, {} remaining",
                amount, order.price, exchange_id, self.remaining
            );

            if amount < order.amount {
                let exchange = self.ledger.get(exchange_id)?;
                self.queue.push(order.remainder(amount), exchange);
            } else {
                self.queue_next(exchange_id)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> ExecutionPlan {
        let filled = self.requested - self.remaining;
        ExecutionPlan {
            orders: consolidate(&self.fills),
            requested: self.requested,
            filled,
            balances: self.ledger.into_balances(),
        }
    }
}

fn validate_order(exchange_id: ExchangeId, order: &BookOrder) -> Result<(), PlanError> {
    if order.exchange_id != exchange_id {
        return Err(PlanError::MismatchedExchangeId {
            key: exchange_id,
            id: order.exchange_id,
        });
    }
    if order.price <= Decimal::ZERO {
        return Err(PlanError::InvalidPrice {
            exchange_id,
            price: order.price,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn exchanges(list: &[(ExchangeId, Decimal, Decimal)]) -> Exchanges {
        list.iter()
            .map(|&(id, quote, base)| (id, Exchange::new(id, quote, base)))
            .collect()
    }

    fn books(list: &[(ExchangeId, &[(Decimal, Decimal)])]) -> OrderBooks {
        list.iter()
            .map(|&(id, orders)| {
                let orders = orders
                    .iter()
                    .map(|&(amount, price)| BookOrder::new(amount, price, id))
                    .collect();
                (id, orders)
            })
            .collect()
    }

    fn buy(amount: Decimal) -> PlanRequest {
        PlanRequest::new(amount, OrderType::Buy)
    }

    #[test]
    fn test_quote_bound_never_overspends() {
        let exchange = Exchange::new(1, dec!(1), dec!(0));
        let bound = quote_bound(&exchange, dec!(3), dec!(1)).unwrap();

        assert!(bound * dec!(3) <= dec!(1));
        assert!(bound > dec!(0.3333));
    }

    #[test]
    fn test_quote_bound_exact_division() {
        let exchange = Exchange::new(1, dec!(10000), dec!(0));
        assert_eq!(quote_bound(&exchange, dec!(2500), dec!(10)).unwrap(), dec!(4));
    }

    #[test]
    fn test_quote_bound_affordable_want_is_kept() {
        let exchange = Exchange::new(1, Decimal::MAX, dec!(0));
        assert_eq!(quote_bound(&exchange, dec!(0.5), dec!(1)).unwrap(), dec!(1));

        // 2 * MAX overflows, so the quote balance decides
        let exchange = Exchange::new(1, dec!(10), dec!(0));
        let bound = quote_bound(&exchange, Decimal::MAX, dec!(2)).unwrap();
        assert!(bound > Decimal::ZERO && bound < dec!(2));
        assert!(bound.checked_mul(Decimal::MAX).unwrap() <= dec!(10));
    }

    #[test]
    fn test_huge_quote_balance_fills_small_order() {
        let plan = ExecutionPlanner::default()
            .plan(
                buy(dec!(1)),
                books(&[(1, &[(dec!(1), dec!(0.5))])]),
                exchanges(&[(1, Decimal::MAX, dec!(0))]),
            )
            .unwrap();

        assert_eq!(plan.orders, vec![Order::new(dec!(1), 1, OrderType::Buy)]);
        assert_eq!(plan.balances[&1].quote_balance, Decimal::MAX - dec!(0.5));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let planner = ExecutionPlanner::default();
        let err = planner
            .plan(buy(dec!(-1)), OrderBooks::new(), Exchanges::new())
            .unwrap_err();
        assert_eq!(err, PlanError::InvalidAmount(dec!(-1)));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_zero_amount_leaves_balances_untouched() {
        let snapshot = exchanges(&[(1, dec!(100), dec!(1))]);
        let plan = ExecutionPlanner::default()
            .plan(buy(dec!(0)), books(&[(1, &[(dec!(1), dec!(1))])]), snapshot.clone())
            .unwrap();

        assert!(plan.is_empty());
        assert_eq!(plan.balances, snapshot);
    }

    #[test]
    fn test_book_for_unknown_exchange_fails_the_run() {
        let err = ExecutionPlanner::default()
            .plan(
                buy(dec!(1)),
                books(&[(9, &[(dec!(1), dec!(1))])]),
                exchanges(&[(1, dec!(100), dec!(0))]),
            )
            .unwrap_err();

        assert_eq!(err, PlanError::UnknownExchange(9));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_zero_priced_order_is_inconsistent() {
        let err = ExecutionPlanner::default()
            .plan(
                buy(dec!(1)),
                books(&[(1, &[(dec!(1), dec!(0))])]),
                exchanges(&[(1, dec!(100), dec!(0))]),
            )
            .unwrap_err();

        assert!(matches!(err, PlanError::InvalidPrice { exchange_id: 1, .. }));
    }

    #[test]
    fn test_empty_levels_are_skipped() {
        let plan = ExecutionPlanner::default()
            .plan(
                buy(dec!(1)),
                books(&[(1, &[(dec!(0), dec!(1)), (dec!(2), dec!(2))])]),
                exchanges(&[(1, dec!(100), dec!(0))]),
            )
            .unwrap();

        assert_eq!(plan.orders, vec![Order::new(dec!(1), 1, OrderType::Buy)]);
        assert_eq!(plan.balances[&1].quote_balance, dec!(98));
    }

    #[test]
    fn test_walks_levels_across_exchanges() {
        let plan = ExecutionPlanner::default()
            .plan(
                buy(dec!(3)),
                books(&[
                    (1, &[(dec!(1), dec!(100)), (dec!(5), dec!(103))]),
                    (2, &[(dec!(1), dec!(101)), (dec!(5), dec!(102))]),
                ]),
                exchanges(&[(1, dec!(1000), dec!(0)), (2, dec!(1000), dec!(0))]),
            )
            .unwrap();

        // 100 (ex 1), 101 (ex 2), 102 (ex 2)
        assert_eq!(
            plan.orders,
            vec![
                Order::new(dec!(1), 1, OrderType::Buy),
                Order::new(dec!(2), 2, OrderType::Buy),
            ]
        );
        assert_eq!(plan.filled, dec!(3));
        assert_eq!(plan.balances[&2].quote_balance, dec!(797));
        assert_eq!(plan.balances[&2].base_balance, dec!(2));
    }

    #[test]
    fn test_balance_limits_then_moves_on() {
        let plan = ExecutionPlanner::default()
            .plan(
                PlanRequest::new(dec!(5), OrderType::Sell),
                books(&[(1, &[(dec!(10), dec!(2))]), (2, &[(dec!(10), dec!(1))])]),
                exchanges(&[(1, dec!(0), dec!(2)), (2, dec!(0), dec!(10))]),
            )
            .unwrap();

        assert_eq!(
            plan.orders,
            vec![
                Order::new(dec!(2), 1, OrderType::Sell),
                Order::new(dec!(3), 2, OrderType::Sell),
            ]
        );
        assert_eq!(plan.balances[&1].base_balance, dec!(0));
        assert_eq!(plan.balances[&1].quote_balance, dec!(4));
    }
}
