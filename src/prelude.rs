//! Prelude module that re-exports the types needed for everyday use.
//!
//! ```rust
//! use matchbook_rs::prelude::*;
//! ```

// The engine façade and its configuration
pub use crate::engine::{EngineConfig, EngineError, MatchingEngine};

// Order submission and inspection
pub use crate::engine::{NewOrder, Order, SharedOrder};

// Book read surface
pub use crate::engine::{BookSnapshot, DepthLevel, OrderBook};

// Trades, fees and event hooks
pub use crate::engine::events::{trade_channel, trade_channel_tokio};
pub use crate::engine::{BookUpdateListener, FeeSchedule, Trade, TradeListener};

// Domain scalars and enums
pub use crate::engine::{
    MIN_ORDER_SIZE, Notional, OrderId, OrderStatus, OrderType, PRICE_SCALE, Price, QTY_SCALE,
    Quantity, Side, Symbol, Timestamp, TradeId,
};

// Utility functions
pub use crate::utils::current_time_nanos;
