//! Executed trades and the engine's event listener types.

use crate::engine::types::{Notional, OrderId, Price, Quantity, Side, Symbol, Timestamp, TradeId};
use serde::Serialize;
use std::sync::Arc;

/// A single execution between a resting maker and an incoming taker.
///
/// The trade price is always the maker's resting price (price improvement
/// goes to the taker). Both fee legs and the rates applied are recorded on
/// the trade; per-account fee accumulation is a front-end concern.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    /// Per-book unique identifier, `<symbol>_<counter>`.
    pub trade_id: TradeId,
    /// The symbol this trade executed on.
    pub symbol: Symbol,
    /// Execution price (the maker's level price), minor units.
    pub price: Price,
    /// Executed quantity.
    pub quantity: Quantity,
    /// The resting order that was matched against.
    pub maker_order_id: OrderId,
    /// The incoming order that initiated the match.
    pub taker_order_id: OrderId,
    /// Side of the taker.
    pub aggressor_side: Side,
    /// Nanosecond execution timestamp.
    pub timestamp: Timestamp,
    /// Fee charged to the maker, in notional units. Negative = rebate.
    pub maker_fee: i128,
    /// Fee charged to the taker, in notional units.
    pub taker_fee: i128,
    /// Maker rate applied, basis points.
    pub maker_fee_bps: i32,
    /// Taker rate applied, basis points.
    pub taker_fee_bps: i32,
}

impl Trade {
    /// Notional value of this trade (`price * quantity`).
    #[must_use]
    #[inline]
    pub fn notional(&self) -> Notional {
        Notional::from(self.price) * Notional::from(self.quantity)
    }
}

/// Callback invoked synchronously for every executed trade, in emission
/// order, from the thread that performed the match. No engine lock is held
/// during the call; the callback must not re-enter the engine.
pub type TradeListener = Arc<dyn Fn(&Trade) + Send + Sync>;

/// Callback invoked when a symbol's visible book changes (limit insertion,
/// partial-fill size reduction). Same threading and re-entrancy rules as
/// [`TradeListener`].
pub type BookUpdateListener = Arc<dyn Fn(&str) + Send + Sync>;
