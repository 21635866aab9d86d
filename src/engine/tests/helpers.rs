//! Shared fixtures for the engine test suite.
//!
//! Tests quote prices and quantities in display units and convert through
//! these helpers, so `px(50_000.0)` reads like the scenario it came from.

use crate::engine::core::MatchingEngine;
use crate::engine::order::NewOrder;
use crate::engine::trade::Trade;
use crate::engine::types::{OrderId, PRICE_SCALE, Price, QTY_SCALE, Quantity, Side};
use parking_lot::Mutex;
use std::sync::Arc;

pub(crate) const SYMBOL: &str = "BTC-USDT";

/// Price in display units to minor units (two decimals).
pub(crate) fn px(price: f64) -> Price {
    (price * PRICE_SCALE as f64).round() as Price
}

/// Quantity in display units to base units (eight decimals).
pub(crate) fn qty(quantity: f64) -> Quantity {
    (quantity * QTY_SCALE as f64).round() as Quantity
}

pub(crate) fn engine() -> MatchingEngine {
    MatchingEngine::new()
}

/// An engine whose trade hook appends every trade to the returned log.
pub(crate) fn recording_engine() -> (MatchingEngine, Arc<Mutex<Vec<Trade>>>) {
    let trades: Arc<Mutex<Vec<Trade>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&trades);
    let mut engine = MatchingEngine::new();
    engine.set_trade_listener(Arc::new(move |trade: &Trade| {
        sink.lock().push(trade.clone());
    }));
    (engine, trades)
}

/// Submit a resting/crossing limit order and return its id.
pub(crate) fn submit_limit(
    engine: &MatchingEngine,
    side: Side,
    price: f64,
    quantity: f64,
) -> OrderId {
    engine
        .submit_order(NewOrder::limit(SYMBOL, side, px(price), qty(quantity)))
        .expect("limit order accepted")
}

pub(crate) fn submit_market(engine: &MatchingEngine, side: Side, quantity: f64) -> OrderId {
    engine
        .submit_order(NewOrder::market(SYMBOL, side, qty(quantity)))
        .expect("market order accepted")
}
