//! The matching engine façade: admission, validation, routing by order
//! type, lifecycle, the stop-order trigger cascade, statistics and event
//! fan-out.

use crate::engine::book::OrderBook;
use crate::engine::error::EngineError;
use crate::engine::fees::FeeSchedule;
use crate::engine::order::{NewOrder, Order, SharedOrder};
use crate::engine::stops::StopOrderManager;
use crate::engine::trade::{BookUpdateListener, Trade, TradeListener};
use crate::engine::types::{
    MIN_ORDER_SIZE, ORDER_ID_WIDTH, OrderId, OrderStatus, OrderType, Price, Quantity, Symbol,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// Engine-wide configuration knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Fee schedule applied by every book this engine creates.
    pub fee_schedule: FeeSchedule,
    /// Smallest admissible order quantity, in quantity units.
    pub min_order_size: Quantity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_schedule: FeeSchedule::default(),
            min_order_size: MIN_ORDER_SIZE,
        }
    }
}

/// A single-venue matching engine over any number of symbols.
///
/// Accepts orders from many threads concurrently; operations on one symbol
/// are serialized by that book's lock, so price-time priority reflects
/// admission order to the book, not wall-clock timestamps. Books are
/// created on first use and live for the engine's lifetime.
///
/// # Examples
///
/// ```
/// use matchbook_rs::prelude::*;
///
/// let engine = MatchingEngine::new();
///
/// let sell = engine
///     .submit_order(NewOrder::limit("BTC-USDT", Side::Sell, 5_000_000, 100_000_000))
///     .unwrap();
/// let buy = engine
///     .submit_order(NewOrder::limit("BTC-USDT", Side::Buy, 5_000_000, 100_000_000))
///     .unwrap();
///
/// assert_eq!(engine.get_order(&sell).unwrap().status, OrderStatus::Filled);
/// assert_eq!(engine.get_order(&buy).unwrap().status, OrderStatus::Filled);
/// assert_eq!(engine.total_trades_executed(), 1);
/// ```
pub struct MatchingEngine {
    /// Symbol to book. Books are never removed while the engine runs.
    books: DashMap<Symbol, Arc<OrderBook>>,

    /// Every order ever admitted, including filled and cancelled ones.
    orders: DashMap<OrderId, SharedOrder>,

    stops: StopOrderManager,

    trade_listener: Option<TradeListener>,
    book_update_listener: Option<BookUpdateListener>,

    config: EngineConfig,

    orders_processed: AtomicU64,
    trades_executed: AtomicU64,
    order_ids: AtomicU64,
}

impl MatchingEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            books: DashMap::new(),
            orders: DashMap::new(),
            stops: StopOrderManager::new(),
            trade_listener: None,
            book_update_listener: None,
            config,
            orders_processed: AtomicU64::new(0),
            trades_executed: AtomicU64::new(0),
            order_ids: AtomicU64::new(0),
        }
    }

    /// Create an engine with both event hooks installed.
    #[must_use]
    pub fn with_listeners(
        config: EngineConfig,
        trade_listener: TradeListener,
        book_update_listener: BookUpdateListener,
    ) -> Self {
        let mut engine = Self::with_config(config);
        engine.trade_listener = Some(trade_listener);
        engine.book_update_listener = Some(book_update_listener);
        engine
    }

    /// Install the trade hook. Invoked synchronously for every trade, in
    /// emission order, with no engine lock held; it must not re-enter the
    /// engine.
    pub fn set_trade_listener(&mut self, listener: TradeListener) {
        self.trade_listener = Some(listener);
    }

    /// Install the book-update hook. For a limit insertion the update is
    /// delivered strictly before any trades that order produces.
    pub fn set_book_update_listener(&mut self, listener: BookUpdateListener) {
        self.book_update_listener = Some(listener);
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Admit an order: validate, register, and route it by type.
    ///
    /// Returns the assigned order id. Market, IOC and FOK orders complete
    /// (or die) before this returns; limit orders may rest; stop orders are
    /// parked pending their trigger. All trades the order produced —
    /// including any stop-trigger cascade — have been published by the time
    /// this returns.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`] validation failure. Rejected orders are not
    /// registered and emit nothing.
    pub fn submit_order(&self, request: NewOrder) -> Result<OrderId, EngineError> {
        let mut order = Order::from(request);
        if order.order_id.is_empty() {
            order.order_id = self.next_order_id();
        }

        if let Err(err) = self.validate(&order) {
            debug!(order_id = %order.order_id, %err, "order rejected");
            return Err(err);
        }

        let order_id = order.order_id.clone();
        trace!(
            order_id = %order_id,
            symbol = %order.symbol,
            order_type = %order.order_type,
            side = %order.side,
            price = order.price,
            quantity = order.quantity,
            "order admitted"
        );

        let shared: SharedOrder = Arc::new(RwLock::new(order));
        self.orders.insert(order_id.clone(), Arc::clone(&shared));

        self.route(&shared);
        self.orders_processed.fetch_add(1, Ordering::Relaxed);

        Ok(order_id)
    }

    /// Cancel an order by id.
    ///
    /// Pending stop orders are withdrawn from the stop-order manager;
    /// resting orders are removed from their book. Returns `false` for
    /// unknown ids, terminal orders, and orders that never rested (market /
    /// IOC / FOK). Safe to call concurrently with matching: if the order
    /// fills before the cancel reaches the book lock, this returns `false`.
    pub fn cancel_order(&self, order_id: &str) -> bool {
        let Some(order) = self.orders.get(order_id).map(|entry| Arc::clone(&entry)) else {
            return false;
        };

        let (status, is_stop, symbol) = {
            let order = order.read();
            (order.status, order.is_stop(), order.symbol.clone())
        };

        if status == OrderStatus::Pending && is_stop {
            return self.stops.cancel(order_id);
        }

        if !matches!(status, OrderStatus::Active | OrderStatus::PartialFill) {
            return false;
        }

        match self.books.get(&symbol) {
            Some(book) => book.cancel_order(order_id),
            None => false,
        }
    }

    /// A point-in-time copy of an order's record, if the id is known.
    #[must_use]
    pub fn get_order(&self, order_id: &str) -> Option<Order> {
        self.orders
            .get(order_id)
            .map(|entry| entry.read().clone())
    }

    /// Read-only handle to the book for `symbol`, if one exists yet.
    #[must_use]
    pub fn order_book(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        self.books.get(symbol).map(|entry| Arc::clone(&entry))
    }

    /// Best bid and ask for `symbol`; `(None, None)` when no book exists.
    #[must_use]
    pub fn bbo(&self, symbol: &str) -> (Option<Price>, Option<Price>) {
        match self.order_book(symbol) {
            Some(book) => book.bbo(),
            None => (None, None),
        }
    }

    /// Symbols with a live order book.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Point-in-time copies of the pending stop orders for `symbol`.
    #[must_use]
    pub fn stop_orders(&self, symbol: &str) -> Vec<Order> {
        self.stops
            .stop_orders(symbol)
            .iter()
            .map(|order| order.read().clone())
            .collect()
    }

    /// Total pending stop orders across all symbols.
    #[must_use]
    pub fn stop_order_count(&self) -> usize {
        self.stops.len()
    }

    /// Orders accepted by [`MatchingEngine::submit_order`] so far.
    #[must_use]
    pub fn total_orders_processed(&self) -> u64 {
        self.orders_processed.load(Ordering::Relaxed)
    }

    /// Trades executed so far, across all symbols.
    #[must_use]
    pub fn total_trades_executed(&self) -> u64 {
        self.trades_executed.load(Ordering::Relaxed)
    }

    fn next_order_id(&self) -> OrderId {
        let counter = self.order_ids.fetch_add(1, Ordering::Relaxed);
        format!("ORD{counter:0width$}", width = ORDER_ID_WIDTH)
    }

    fn validate(&self, order: &Order) -> Result<(), EngineError> {
        if order.symbol.is_empty() {
            return Err(EngineError::SymbolRequired);
        }
        if order.quantity == 0 {
            return Err(EngineError::NonPositiveQuantity);
        }
        if order.quantity < self.config.min_order_size {
            return Err(EngineError::QuantityBelowMinimum {
                quantity: order.quantity,
                min: self.config.min_order_size,
            });
        }

        match order.order_type {
            OrderType::Market | OrderType::StopLoss | OrderType::TakeProfit => {
                if order.price != 0 {
                    return Err(EngineError::PriceForbidden {
                        order_type: order.order_type,
                        price: order.price,
                    });
                }
            }
            OrderType::Limit | OrderType::Ioc | OrderType::Fok | OrderType::StopLimit => {
                if order.price == 0 {
                    return Err(EngineError::LimitPriceRequired {
                        order_type: order.order_type,
                    });
                }
            }
        }

        if order.is_stop() && order.stop_price == 0 {
            return Err(EngineError::StopPriceRequired {
                order_type: order.order_type,
            });
        }

        Ok(())
    }

    fn book_for(&self, symbol: &str) -> Arc<OrderBook> {
        let entry = self
            .books
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(OrderBook::new(symbol, self.config.fee_schedule)));
        Arc::clone(&entry)
    }

    /// Dispatch an order to its type-specific flow. Also re-entered for
    /// every triggered stop order during a cascade.
    fn route(&self, order: &SharedOrder) {
        let (order_type, symbol) = {
            let order = order.read();
            (order.order_type, order.symbol.clone())
        };

        match order_type {
            OrderType::StopLoss | OrderType::StopLimit | OrderType::TakeProfit => {
                self.process_stop_order(order);
            }
            OrderType::Market => {
                let book = self.book_for(&symbol);
                self.process_market_order(order, &book);
            }
            OrderType::Limit => {
                let book = self.book_for(&symbol);
                self.process_limit_order(order, &book);
            }
            OrderType::Ioc => {
                let book = self.book_for(&symbol);
                self.process_ioc_order(order, &book);
            }
            OrderType::Fok => {
                let book = self.book_for(&symbol);
                self.process_fok_order(order, &book);
            }
        }
    }

    /// Market orders take whatever rests, at any price, and never rest
    /// themselves. The unfilled remainder is discarded.
    fn process_market_order(&self, order: &SharedOrder, book: &OrderBook) {
        let trades = book.match_order(order);
        self.publish_trades(&trades);

        let mut order = order.write();
        order.status = if order.is_fully_filled() {
            OrderStatus::Filled
        } else if order.filled_quantity > 0 {
            OrderStatus::PartialFill
        } else {
            OrderStatus::Cancelled
        };
    }

    /// Limit orders rest first, then match against the opposite side.
    ///
    /// Inserting before matching publishes the order's visibility before
    /// any executions; matching only reads the opposite side, so the order
    /// can never trade against itself.
    fn process_limit_order(&self, order: &SharedOrder, book: &OrderBook) {
        book.insert_order(order);
        self.publish_book_update(book.symbol());

        let trades = book.match_order(order);
        self.publish_trades(&trades);

        let (order_id, fully_filled, any_fill) = {
            let order = order.read();
            (
                order.order_id.clone(),
                order.is_fully_filled(),
                order.filled_quantity > 0,
            )
        };

        if fully_filled {
            book.remove_order(&order_id);
            order.write().status = OrderStatus::Filled;
        } else if any_fill {
            order.write().status = OrderStatus::PartialFill;
            // Still on the book with reduced size.
            self.publish_book_update(book.symbol());
        }
        // No fill: stays ACTIVE where insert_order left it.
    }

    /// IOC orders match immediately without resting; the remainder is
    /// always discarded.
    fn process_ioc_order(&self, order: &SharedOrder, book: &OrderBook) {
        let trades = book.match_order(order);
        self.publish_trades(&trades);

        let mut order = order.write();
        order.status = if order.is_fully_filled() {
            OrderStatus::Filled
        } else if order.filled_quantity > 0 {
            OrderStatus::PartialFill
        } else {
            OrderStatus::Cancelled
        };
    }

    /// FOK orders check feasibility first and emit either a complete fill
    /// or nothing at all.
    fn process_fok_order(&self, order: &SharedOrder, book: &OrderBook) {
        let snapshot = order.read().clone();
        if !book.can_fill_fok(&snapshot) {
            order.write().status = OrderStatus::Cancelled;
            debug!(order_id = %snapshot.order_id, "FOK killed: cannot fill completely");
            return;
        }

        let trades = book.match_order(order);
        self.publish_trades(&trades);

        let mut order = order.write();
        if order.is_fully_filled() {
            order.status = OrderStatus::Filled;
        } else {
            // Feasibility passed but the fill came up short; treat it as a
            // kill rather than resting a partial.
            warn!(
                order_id = %order.order_id,
                filled = order.filled_quantity,
                quantity = order.quantity,
                "FOK shortfall after feasibility check"
            );
            order.status = OrderStatus::Cancelled;
        }
    }

    /// Stop orders validate their trigger fields and wait in the stop-order
    /// manager; nothing is emitted until they fire.
    fn process_stop_order(&self, order: &SharedOrder) {
        let (order_id, order_type, price, stop_price) = {
            let order = order.read();
            (
                order.order_id.clone(),
                order.order_type,
                order.price,
                order.stop_price,
            )
        };

        // Admission already validated these; re-check before parking so a
        // malformed order can never sit untriggerable forever.
        if stop_price == 0 || (order_type == OrderType::StopLimit && price == 0) {
            warn!(order_id = %order_id, %order_type, "stop order with invalid trigger fields");
            order.write().status = OrderStatus::Rejected;
            return;
        }

        self.stops.add(order);
    }

    /// Deliver trades in emission order and run the trigger cascade.
    ///
    /// After each trade: the trade hook fires, the executed counter ticks,
    /// and every stop order triggered by that trade price is re-routed
    /// through [`MatchingEngine::route`] — whose own trades recurse through
    /// here. Termination holds because each trigger pass removes the
    /// returned orders from the finite pending set. No lock is held while
    /// the hook runs.
    fn publish_trades(&self, trades: &[Trade]) {
        for trade in trades {
            if let Some(listener) = &self.trade_listener {
                listener(trade);
            }
            self.trades_executed.fetch_add(1, Ordering::Relaxed);

            let triggered = self.stops.check_triggers(&trade.symbol, trade.price);
            for order in triggered {
                self.route(&order);
            }
        }
    }

    fn publish_book_update(&self, symbol: &str) {
        if let Some(listener) = &self.book_update_listener {
            listener(symbol);
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
