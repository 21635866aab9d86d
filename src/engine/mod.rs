//! The matching engine core: domain types, per-symbol order books, the
//! stop-order manager, and the engine façade that ties them together.

mod book;
mod core;
mod error;
mod fees;
mod level;
mod order;
mod snapshot;
mod stops;
mod trade;
mod types;

pub mod events;

#[cfg(test)]
mod tests;

pub use book::OrderBook;
pub use self::core::{EngineConfig, MatchingEngine};
pub use error::EngineError;
pub use fees::FeeSchedule;
pub use level::PriceLevel;
pub use order::{NewOrder, Order, SharedOrder};
pub use snapshot::{BookSnapshot, DepthLevel};
pub use stops::StopOrderManager;
pub use trade::{BookUpdateListener, Trade, TradeListener};
pub use types::{
    DEFAULT_MAKER_FEE_BPS, DEFAULT_TAKER_FEE_BPS, MIN_ORDER_SIZE, Notional, ORDER_ID_WIDTH,
    OrderId, OrderStatus, OrderType, PRICE_SCALE, Price, QTY_SCALE, Quantity, Side, Symbol,
    TRADE_ID_WIDTH, Timestamp, TradeId,
};
