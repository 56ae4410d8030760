// Core planning logic modules

pub mod types;
pub mod frontier;
pub mod ledger;
pub mod queue;
pub mod consolidator;
pub mod planner;

// Re-export commonly used types
pub use types::{
    BookOrder, Exchange, ExchangeId, Exchanges, ExecutionPlan, Order, OrderBooks, OrderType,
    PlanRequest,
};
pub use frontier::OrderBookFrontier;
pub use ledger::BalanceLedger;
pub use queue::{FrontierQueue, TieBreak};
pub use consolidator::consolidate;
pub use planner::ExecutionPlanner;
