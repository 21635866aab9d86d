//! Book surface: depth aggregation, BBO maintenance, cancellation and
//! snapshots.

use super::helpers::*;
use crate::engine::types::{OrderStatus, Side};

#[test]
fn depth_aggregates_per_level_best_first() {
    let engine = engine();

    submit_limit(&engine, Side::Buy, 49_900.0, 1.0);
    submit_limit(&engine, Side::Buy, 50_000.0, 0.4);
    submit_limit(&engine, Side::Buy, 50_000.0, 0.6);
    submit_limit(&engine, Side::Sell, 50_100.0, 0.7);
    submit_limit(&engine, Side::Sell, 50_200.0, 0.3);

    let book = engine.order_book(SYMBOL).unwrap();

    let bids = book.bids(10);
    assert_eq!(bids.len(), 2);
    assert_eq!((bids[0].price, bids[0].quantity), (px(50_000.0), qty(1.0)));
    assert_eq!((bids[1].price, bids[1].quantity), (px(49_900.0), qty(1.0)));

    let asks = book.asks(10);
    assert_eq!(asks.len(), 2);
    assert_eq!((asks[0].price, asks[0].quantity), (px(50_100.0), qty(0.7)));
    assert_eq!((asks[1].price, asks[1].quantity), (px(50_200.0), qty(0.3)));

    // Depth limit truncates from the best price.
    assert_eq!(book.bids(1).len(), 1);
    assert_eq!(book.bids(1)[0].price, px(50_000.0));

    book.assert_invariants();
}

#[test]
fn bbo_tracks_inserts_and_cancels() {
    let engine = engine();

    let best_bid = submit_limit(&engine, Side::Buy, 50_000.0, 1.0);
    submit_limit(&engine, Side::Buy, 49_900.0, 1.0);
    submit_limit(&engine, Side::Sell, 50_100.0, 1.0);

    assert_eq!(engine.bbo(SYMBOL), (Some(px(50_000.0)), Some(px(50_100.0))));

    assert!(engine.cancel_order(&best_bid));
    assert_eq!(engine.bbo(SYMBOL), (Some(px(49_900.0)), Some(px(50_100.0))));

    engine.order_book(SYMBOL).unwrap().assert_invariants();
}

#[test]
fn cancel_is_idempotent() {
    let engine = engine();

    let order = submit_limit(&engine, Side::Buy, 50_000.0, 1.0);

    assert!(engine.cancel_order(&order));
    assert_eq!(
        engine.get_order(&order).unwrap().status,
        OrderStatus::Cancelled
    );

    // Second and later calls return false and change nothing.
    assert!(!engine.cancel_order(&order));
    assert_eq!(
        engine.get_order(&order).unwrap().status,
        OrderStatus::Cancelled
    );
    assert_eq!(engine.order_book(SYMBOL).unwrap().total_orders(), 0);
}

#[test]
fn cancel_unknown_and_terminal_orders_returns_false() {
    let engine = engine();

    assert!(!engine.cancel_order("ORD999999999999"));

    let sell = submit_limit(&engine, Side::Sell, 50_000.0, 1.0);
    submit_limit(&engine, Side::Buy, 50_000.0, 1.0);

    // Filled is terminal.
    assert_eq!(engine.get_order(&sell).unwrap().status, OrderStatus::Filled);
    assert!(!engine.cancel_order(&sell));
}

#[test]
fn cancelling_partial_fill_removes_the_remainder() {
    let engine = engine();

    let sell = submit_limit(&engine, Side::Sell, 50_000.0, 2.0);
    submit_limit(&engine, Side::Buy, 50_000.0, 0.5);

    assert_eq!(
        engine.get_order(&sell).unwrap().status,
        OrderStatus::PartialFill
    );
    assert!(engine.cancel_order(&sell));

    let sell_order = engine.get_order(&sell).unwrap();
    assert_eq!(sell_order.status, OrderStatus::Cancelled);
    assert_eq!(sell_order.filled_quantity, qty(0.5));
    assert_eq!(engine.bbo(SYMBOL), (None, None));
}

#[test]
fn emptied_levels_are_erased() {
    let engine = engine();

    submit_limit(&engine, Side::Sell, 50_000.0, 1.0);
    submit_limit(&engine, Side::Sell, 50_100.0, 1.0);
    submit_market(&engine, Side::Buy, 1.0);

    let book = engine.order_book(SYMBOL).unwrap();
    let asks = book.asks(10);
    assert_eq!(asks.len(), 1);
    assert_eq!(asks[0].price, px(50_100.0));
    book.assert_invariants();
}

#[test]
fn spread_and_last_trade_price() {
    let engine = engine();
    submit_limit(&engine, Side::Buy, 49_900.0, 1.0);
    submit_limit(&engine, Side::Sell, 50_100.0, 1.0);

    let book = engine.order_book(SYMBOL).unwrap();
    assert_eq!(book.spread(), Some(px(200.0)));
    assert_eq!(book.last_trade_price(), None);

    submit_market(&engine, Side::Buy, 0.5);
    assert_eq!(book.last_trade_price(), Some(px(50_100.0)));
}

#[test]
fn snapshot_captures_both_sides_with_metrics() {
    let engine = engine();

    submit_limit(&engine, Side::Buy, 50_000.0, 1.0);
    submit_limit(&engine, Side::Buy, 49_900.0, 2.0);
    submit_limit(&engine, Side::Sell, 50_100.0, 1.5);

    let snapshot = engine.order_book(SYMBOL).unwrap().snapshot(10);
    assert_eq!(snapshot.symbol, SYMBOL);
    assert_eq!(snapshot.bids.len(), 2);
    assert_eq!(snapshot.asks.len(), 1);
    assert_eq!(snapshot.best_bid().unwrap().price, px(50_000.0));
    assert_eq!(snapshot.best_ask().unwrap().price, px(50_100.0));
    assert_eq!(snapshot.spread(), Some(px(100.0)));
    assert_eq!(snapshot.total_bid_volume(), qty(3.0));
    assert_eq!(snapshot.total_ask_volume(), qty(1.5));
    assert!(!snapshot.checksum().unwrap().is_empty());
}

#[test]
fn books_are_independent_per_symbol() {
    let engine = engine();

    submit_limit(&engine, Side::Buy, 50_000.0, 1.0);
    engine
        .submit_order(crate::engine::order::NewOrder::limit(
            "ETH-USDT",
            Side::Sell,
            px(3_000.0),
            qty(2.0),
        ))
        .unwrap();

    assert_eq!(engine.bbo(SYMBOL), (Some(px(50_000.0)), None));
    assert_eq!(engine.bbo("ETH-USDT"), (None, Some(px(3_000.0))));
    assert_eq!(engine.bbo("SOL-USDT"), (None, None));

    let mut symbols = engine.symbols();
    symbols.sort();
    assert_eq!(symbols, ["BTC-USDT", "ETH-USDT"]);
}
