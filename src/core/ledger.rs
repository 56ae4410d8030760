// Balance ledger
// In-memory exchange balances, updated as fills are applied during a run

use rust_decimal::Decimal;

use super::types::{Exchange, ExchangeId, Exchanges, OrderType};
use crate::error::PlanError;

/// Mutable copy of the exchanges' balances for one planning run.
#[derive(Debug, Clone)]
pub struct BalanceLedger {
    balances: Exchanges,
}

impl BalanceLedger {
    /// Take a snapshot of the exchanges.
    ///
    /// Rejects snapshots whose keys disagree with the exchange ids or that
    /// already hold a negative balance.
    pub fn new(exchanges: Exchanges) -> Result<Self, PlanError> {
        for (&key, exchange) in &exchanges {
            if key != exchange.id {
                return Err(PlanError::MismatchedExchangeId { key, id: exchange.id });
            }
            if exchange.quote_balance < Decimal::ZERO || exchange.base_balance < Decimal::ZERO {
                return Err(PlanError::NegativeBalance(exchange.id));
            }
        }

        Ok(Self { balances: exchanges })
    }

    pub fn get(&self, exchange_id: ExchangeId) -> Result<&Exchange, PlanError> {
        self.balances
            .get(&exchange_id)
            .ok_or(PlanError::UnknownExchange(exchange_id))
    }

    /// Book a fill of `amount` base currency at `price`.
    ///
    /// Buy: base += amount, quote -= amount * price.
    /// Sell: base -= amount, quote += amount * price.
    pub fn apply(
        &mut self,
        exchange_id: ExchangeId,
        order_type: OrderType,
        amount: Decimal,
        price: Decimal,
    ) -> Result<&Exchange, PlanError> {
        let exchange = self
            .balances
            .get_mut(&exchange_id)
            .ok_or(PlanError::UnknownExchange(exchange_id))?;

        let notional = amount
            .checked_mul(price)
            .ok_or(PlanError::ArithmeticOverflow(exchange_id))?;

        let (quote, base) = match order_type {
            OrderType::Buy => (
                exchange.quote_balance.checked_sub(notional),
                exchange.base_balance.checked_add(amount),
            ),
            OrderType::Sell => (
                exchange.quote_balance.checked_add(notional),
                exchange.base_balance.checked_sub(amount),
            ),
        };
        let (quote, base) = match (quote, base) {
            (Some(quote), Some(base)) => (quote, base),
            _ => return Err(PlanError::ArithmeticOverflow(exchange_id)),
        };

        if quote < Decimal::ZERO || base < Decimal::ZERO {
            return Err(PlanError::Overdraft(exchange_id));
        }

        exchange.quote_balance = quote;
        exchange.base_balance = base;
        Ok(exchange)
    }

    pub fn into_balances(self) -> Exchanges {
        self.balances
    }
}
