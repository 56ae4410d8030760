//! Market order service
//!
//! Entry point shared by the CLI and the HTTP API: takes a snapshot from the
//! configured sources and runs the planner over it.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::planner::ExecutionPlanner;
use crate::core::types::{ExecutionPlan, OrderType, PlanRequest};
use crate::error::{MetaExchangeResult, PlanError};
use crate::sources::{ExchangeSource, OrderBookSource};

/// Plans market orders against fresh snapshots.
///
/// Cheap to clone; every clone shares the same sources.
#[derive(Clone)]
pub struct MarketOrderService {
    books: Arc<dyn OrderBookSource>,
    exchanges: Arc<dyn ExchangeSource>,
    planner: ExecutionPlanner,
}

impl MarketOrderService {
    pub fn new(
        books: Arc<dyn OrderBookSource>,
        exchanges: Arc<dyn ExchangeSource>,
        planner: ExecutionPlanner,
    ) -> Self {
        Self {
            books,
            exchanges,
            planner,
        }
    }

    /// Plan a market order for `amount` of base currency.
    ///
    /// Balances are read first, then the side of the books the order fills
    /// against. The returned plan is never applied to the balance store.
    pub fn place_market_order(
        &self,
        amount: Decimal,
        order_type: OrderType,
    ) -> MetaExchangeResult<ExecutionPlan> {
        if amount < Decimal::ZERO {
            return Err(PlanError::InvalidAmount(amount).into());
        }

        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let exchanges = self.exchanges.exchanges()?;
        if amount.is_zero() {
            debug!("[{}] Zero amount requested, nothing to plan", run_id);
            return Ok(ExecutionPlan::empty(amount, exchanges));
        }

        let books = self.books.books_for(order_type)?;
        debug!(
            "[{}] Snapshot: {} exchanges, {} books",
            run_id,
            exchanges.len(),
            books.len()
        );

        let plan = self
            .planner
            .plan(PlanRequest::new(amount, order_type), books, exchanges)?;

        info!(
            "📋 [{}] {} {}: {} orders, filled {} in {:?}",
            run_id,
            order_type,
            amount,
            plan.orders.len(),
            plan.filled,
            started.elapsed()
        );
        if plan.is_partial() {
            warn!(
                "⚠️ [{}] Only {} of {} could be filled, {} left",
                run_id,
                plan.filled,
                plan.requested,
                plan.unfilled()
            );
        }

        Ok(plan)
    }
}
