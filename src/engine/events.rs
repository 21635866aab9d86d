//! Channel adapters that turn the engine's synchronous listener hooks into
//! queue-fed event streams.
//!
//! The engine invokes listeners from the matching thread; these adapters
//! move each event onto a channel so a consumer thread or task can process
//! trades off the hot path.

use crate::engine::trade::{Trade, TradeListener};
use std::sync::Arc;
use std::sync::mpsc;
use tracing::error;

/// A trade listener backed by a standard library mpsc channel.
///
/// Install the returned listener on the engine and drain the receiver from
/// a consumer thread.
///
/// # Examples
///
/// ```
/// use matchbook_rs::prelude::*;
///
/// let (listener, trades) = trade_channel();
/// let mut engine = MatchingEngine::new();
/// engine.set_trade_listener(listener);
///
/// engine
///     .submit_order(NewOrder::limit("BTC-USDT", Side::Sell, 5_000_000, 100))
///     .unwrap();
/// engine
///     .submit_order(NewOrder::limit("BTC-USDT", Side::Buy, 5_000_000, 100))
///     .unwrap();
///
/// let trade = trades.recv().unwrap();
/// assert_eq!(trade.price, 5_000_000);
/// ```
#[must_use]
pub fn trade_channel() -> (TradeListener, mpsc::Receiver<Trade>) {
    let (sender, receiver) = mpsc::channel();
    let listener: TradeListener = Arc::new(move |trade: &Trade| {
        if let Err(err) = sender.send(trade.clone()) {
            error!("trade receiver dropped: {err}");
        }
    });
    (listener, receiver)
}

/// A trade listener backed by a Tokio unbounded mpsc channel, for async
/// consumers. The listener itself stays synchronous and never blocks.
#[must_use]
pub fn trade_channel_tokio() -> (TradeListener, tokio::sync::mpsc::UnboundedReceiver<Trade>) {
    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    let listener: TradeListener = Arc::new(move |trade: &Trade| {
        if let Err(err) = sender.send(trade.clone()) {
            error!("trade receiver dropped: {err}");
        }
    });
    (listener, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::MatchingEngine;
    use crate::engine::order::NewOrder;
    use crate::engine::types::Side;

    #[test]
    fn std_channel_receives_trades_in_order() {
        let (listener, trades) = trade_channel();
        let mut engine = MatchingEngine::new();
        engine.set_trade_listener(listener);

        engine
            .submit_order(NewOrder::limit("BTC-USDT", Side::Sell, 5_000_000, 100))
            .unwrap();
        engine
            .submit_order(NewOrder::limit("BTC-USDT", Side::Sell, 5_010_000, 100))
            .unwrap();
        engine
            .submit_order(NewOrder::market("BTC-USDT", Side::Buy, 200))
            .unwrap();

        let first = trades.recv().unwrap();
        let second = trades.recv().unwrap();
        assert_eq!(first.price, 5_000_000);
        assert_eq!(second.price, 5_010_000);
        assert!(trades.try_recv().is_err());
    }

    #[tokio::test]
    async fn tokio_channel_receives_trades() {
        let (listener, mut trades) = trade_channel_tokio();
        let mut engine = MatchingEngine::new();
        engine.set_trade_listener(listener);

        engine
            .submit_order(NewOrder::limit("BTC-USDT", Side::Sell, 5_000_000, 100))
            .unwrap();
        engine
            .submit_order(NewOrder::ioc("BTC-USDT", Side::Buy, 5_000_000, 100))
            .unwrap();

        let trade = trades.recv().await.unwrap();
        assert_eq!(trade.quantity, 100);
        assert_eq!(trade.aggressor_side, Side::Buy);
    }
}
