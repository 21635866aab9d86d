//! # Single-Venue Limit-Order Matching Engine
//!
//! A matching engine core for one trading venue: it accepts orders for any
//! number of symbols, maintains a per-symbol limit order book, matches
//! incoming orders against resting liquidity under strict price-time
//! priority with a no-trade-through guarantee, supports conditional
//! (stop / take-profit) orders through a deferred-trigger mechanism, and
//! emits trade and book-update events to caller-supplied hooks.
//!
//! ## Key Features
//!
//! - **Price-time priority**: each book keeps two price-ordered level maps
//!   with FIFO queues at every price. Matching walks the opposite side best
//!   price first and serves each level in arrival order; trades always
//!   execute at the maker's resting price.
//!
//! - **Seven order protocols**: MARKET, LIMIT, IOC and FOK execute on
//!   arrival with their distinct resting and cancellation rules; STOP_LOSS,
//!   STOP_LIMIT and TAKE_PROFIT wait off-book and convert to market or
//!   limit orders when an executed trade crosses their stop price.
//!
//! - **Trigger cascade**: every executed trade is checked against the
//!   pending stop orders of its symbol; triggered orders re-enter the
//!   router, and the trades *they* produce can trigger further stops. The
//!   cascade is synchronous, ordered, and finite.
//!
//! - **Concurrent admission**: the engine takes orders from many threads.
//!   Per-symbol operations are serialized by a coarse book lock; the
//!   engine-wide maps are concurrent. No lock is ever held across a
//!   user-supplied callback.
//!
//! - **Exact integer arithmetic**: prices carry two implied decimals and
//!   quantities eight, so every comparison on the matching path is exact.
//!   No floating point anywhere near matching decisions.
//!
//! - **Maker/taker fees**: each trade records both fee legs and the basis
//!   point rates applied, computed from a configurable schedule.
//!
//! ## Example
//!
//! ```
//! use matchbook_rs::prelude::*;
//!
//! let engine = MatchingEngine::new();
//!
//! // Rest an ask, then cross it with a market buy.
//! engine
//!     .submit_order(NewOrder::limit("BTC-USDT", Side::Sell, 5_000_000, 100_000_000))
//!     .unwrap();
//! let buy = engine
//!     .submit_order(NewOrder::market("BTC-USDT", Side::Buy, 100_000_000))
//!     .unwrap();
//!
//! let order = engine.get_order(&buy).unwrap();
//! assert_eq!(order.status, OrderStatus::Filled);
//! assert_eq!(engine.bbo("BTC-USDT"), (None, None));
//! ```
//!
//! ## Scope
//!
//! The crate is the core an exchange front-end builds on. Transport
//! (REST / WebSocket), authentication, rate limiting, persistence and
//! replay are external collaborators: they translate wire messages into
//! the [`MatchingEngine`] API and consume its event hooks. Self-trade
//! prevention and order modification (cancel-replace) are deliberately not
//! provided.

pub mod engine;

pub mod prelude;
mod utils;

pub use engine::events::{trade_channel, trade_channel_tokio};
pub use engine::{
    BookSnapshot, BookUpdateListener, DepthLevel, EngineConfig, EngineError, FeeSchedule,
    MatchingEngine, NewOrder, Notional, Order, OrderBook, OrderId, OrderStatus, OrderType, Price,
    PriceLevel, Quantity, SharedOrder, Side, StopOrderManager, Symbol, Timestamp, Trade, TradeId,
    TradeListener,
};
pub use utils::current_time_nanos;
