//! Per-symbol order book: price-indexed level maps, order lookup, BBO cache
//! and the matching primitive.

use crate::engine::fees::FeeSchedule;
use crate::engine::level::PriceLevel;
use crate::engine::order::{Order, SharedOrder};
use crate::engine::snapshot::{BookSnapshot, DepthLevel};
use crate::engine::trade::Trade;
use crate::engine::types::{
    Notional, OrderId, OrderStatus, Price, Quantity, Side, Symbol, TRADE_ID_WIDTH, TradeId,
};
use crate::utils::current_time_nanos;
use crossbeam::atomic::AtomicCell;
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Everything the book mutex protects: both sides, the id lookup and the
/// BBO cache. Bids are keyed by `Reverse(price)` so the first map entry is
/// the best price on either side.
#[derive(Default)]
struct Ladder {
    bids: BTreeMap<Reverse<Price>, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    orders: HashMap<OrderId, SharedOrder>,
    best_bid: Option<Price>,
    best_ask: Option<Price>,
}

impl Ladder {
    fn refresh_bbo(&mut self) {
        self.best_bid = self.bids.first_key_value().map(|(key, _)| key.0);
        self.best_ask = self.asks.first_key_value().map(|(key, _)| *key);
    }
}

/// The order book for one symbol.
///
/// All structural mutation happens under a single coarse mutex, so
/// operations on one symbol are totally ordered by lock acquisition;
/// price-time priority reflects that order, not wall-clock timestamps.
/// The mutex is never held across listener callbacks.
pub struct OrderBook {
    symbol: Symbol,
    ladder: Mutex<Ladder>,

    /// Source of the per-book insertion sequence used for time priority.
    sequence: AtomicU64,

    /// Source of per-book trade id counters.
    trade_ids: AtomicU64,

    /// The price of the most recent trade on this book, if any.
    last_trade: AtomicCell<Option<Price>>,

    fee_schedule: FeeSchedule,
}

impl OrderBook {
    pub(crate) fn new(symbol: &str, fee_schedule: FeeSchedule) -> Self {
        Self {
            symbol: symbol.to_string(),
            ladder: Mutex::new(Ladder::default()),
            sequence: AtomicU64::new(0),
            trade_ids: AtomicU64::new(0),
            last_trade: AtomicCell::new(None),
            fee_schedule,
        }
    }

    /// The symbol this book trades.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The fee schedule applied to trades on this book.
    #[must_use]
    pub fn fee_schedule(&self) -> FeeSchedule {
        self.fee_schedule
    }

    /// Best bid and best ask, from the maintained cache.
    #[must_use]
    pub fn bbo(&self) -> (Option<Price>, Option<Price>) {
        let ladder = self.ladder.lock();
        (ladder.best_bid, ladder.best_ask)
    }

    /// Best ask minus best bid, when both sides are populated.
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        let (bid, ask) = self.bbo();
        match (bid, ask) {
            (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }

    /// Price of the most recent trade on this book, if any has occurred.
    #[must_use]
    pub fn last_trade_price(&self) -> Option<Price> {
        self.last_trade.load()
    }

    /// Number of orders currently resting on this book.
    #[must_use]
    pub fn total_orders(&self) -> usize {
        self.ladder.lock().orders.len()
    }

    /// Top `depth` aggregated bid levels, best (highest) first.
    #[must_use]
    pub fn bids(&self, depth: usize) -> Vec<DepthLevel> {
        let ladder = self.ladder.lock();
        ladder
            .bids
            .iter()
            .take(depth)
            .map(|(key, level)| DepthLevel {
                price: key.0,
                quantity: level.total_quantity(),
            })
            .collect()
    }

    /// Top `depth` aggregated ask levels, best (lowest) first.
    #[must_use]
    pub fn asks(&self, depth: usize) -> Vec<DepthLevel> {
        let ladder = self.ladder.lock();
        ladder
            .asks
            .iter()
            .take(depth)
            .map(|(key, level)| DepthLevel {
                price: *key,
                quantity: level.total_quantity(),
            })
            .collect()
    }

    /// A stable top-`depth` snapshot of both sides, taken under one lock
    /// acquisition.
    #[must_use]
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let ladder = self.ladder.lock();
        BookSnapshot {
            symbol: self.symbol.clone(),
            timestamp: current_time_nanos(),
            bids: ladder
                .bids
                .iter()
                .take(depth)
                .map(|(key, level)| DepthLevel {
                    price: key.0,
                    quantity: level.total_quantity(),
                })
                .collect(),
            asks: ladder
                .asks
                .iter()
                .take(depth)
                .map(|(key, level)| DepthLevel {
                    price: *key,
                    quantity: level.total_quantity(),
                })
                .collect(),
        }
    }

    /// Rest an order on its own side of the book.
    ///
    /// Assigns the time-priority sequence, flips the status to `ACTIVE`,
    /// registers the order in the id lookup and refreshes the BBO cache.
    /// Only limit orders rest; market, IOC, FOK and stop orders never pass
    /// through here.
    pub(crate) fn insert_order(&self, order: &SharedOrder) {
        let mut ladder = self.ladder.lock();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        let (order_id, side, price) = {
            let mut order = order.write();
            order.sequence = sequence;
            order.status = OrderStatus::Active;
            (order.order_id.clone(), order.side, order.price)
        };

        match side {
            Side::Buy => ladder
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price))
                .add(SharedOrder::clone(order)),
            Side::Sell => ladder
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price))
                .add(SharedOrder::clone(order)),
        }

        trace!(
            symbol = %self.symbol,
            order_id = %order_id,
            %side,
            price,
            sequence,
            "order resting on book"
        );

        ladder.orders.insert(order_id, SharedOrder::clone(order));
        ladder.refresh_bbo();
    }

    /// Remove a resting order without touching its status.
    ///
    /// Erases the level when it empties, deregisters the order and refreshes
    /// the BBO cache. Returns the removed order, or `None` if it was not
    /// resting here.
    pub(crate) fn remove_order(&self, order_id: &str) -> Option<SharedOrder> {
        let mut ladder = self.ladder.lock();
        let order = ladder.orders.get(order_id).cloned()?;
        let (side, price) = {
            let order = order.read();
            (order.side, order.price)
        };

        let removed = match side {
            Side::Buy => Self::remove_from_side(&mut ladder.bids, Reverse(price), order_id),
            Side::Sell => Self::remove_from_side(&mut ladder.asks, price, order_id),
        };
        if !removed {
            return None;
        }

        ladder.orders.remove(order_id);
        ladder.refresh_bbo();
        Some(order)
    }

    fn remove_from_side<K: Ord>(
        side: &mut BTreeMap<K, PriceLevel>,
        key: K,
        order_id: &str,
    ) -> bool {
        let Some(level) = side.get_mut(&key) else {
            return false;
        };
        let removed = level.remove(order_id);
        if removed && level.is_empty() {
            side.remove(&key);
        }
        removed
    }

    /// Cancel a resting order: remove it and mark it `CANCELLED`.
    ///
    /// Idempotent; returns whether the order was found on the book. An
    /// order that already filled (or was never here) yields `false` and
    /// leaves all state unchanged.
    pub(crate) fn cancel_order(&self, order_id: &str) -> bool {
        match self.remove_order(order_id) {
            Some(order) => {
                order.write().status = OrderStatus::Cancelled;
                trace!(symbol = %self.symbol, order_id, "order cancelled");
                true
            }
            None => false,
        }
    }

    /// Match an incoming taker against the opposite side of the book.
    ///
    /// Walks the opposite side best price first, serving each level in FIFO
    /// order, until the taker fills or no remaining level satisfies the
    /// taker's price bound (the no-trade-through guarantee). Each trade
    /// executes at the maker's resting price. Fully consumed makers leave
    /// both their level and the id lookup. Returns the trades in execution
    /// order; the caller publishes them after this lock is released.
    pub(crate) fn match_order(&self, taker: &SharedOrder) -> Vec<Trade> {
        let mut ladder = self.ladder.lock();
        let mut trades = Vec::new();
        let taker_side = taker.read().side;

        {
            let Ladder {
                bids, asks, orders, ..
            } = &mut *ladder;
            match taker_side {
                Side::Buy => self.match_against_asks(asks, orders, taker, &mut trades),
                Side::Sell => self.match_against_bids(bids, orders, taker, &mut trades),
            }
        }

        ladder.refresh_bbo();
        if let Some(last) = trades.last() {
            self.last_trade.store(Some(last.price));
        }
        trades
    }

    fn match_against_asks(
        &self,
        asks: &mut BTreeMap<Price, PriceLevel>,
        orders: &mut HashMap<OrderId, SharedOrder>,
        taker: &SharedOrder,
        trades: &mut Vec<Trade>,
    ) {
        loop {
            if taker.read().is_fully_filled() {
                break;
            }
            let Some(mut entry) = asks.first_entry() else {
                break;
            };
            let level_price = *entry.key();
            if !taker.read().can_match_at(level_price) {
                break;
            }
            let level = entry.get_mut();
            self.fill_level(level, orders, taker, trades);
            if level.is_empty() {
                entry.remove();
            }
        }
    }

    fn match_against_bids(
        &self,
        bids: &mut BTreeMap<Reverse<Price>, PriceLevel>,
        orders: &mut HashMap<OrderId, SharedOrder>,
        taker: &SharedOrder,
        trades: &mut Vec<Trade>,
    ) {
        loop {
            if taker.read().is_fully_filled() {
                break;
            }
            let Some(mut entry) = bids.first_entry() else {
                break;
            };
            let level_price = entry.key().0;
            if !taker.read().can_match_at(level_price) {
                break;
            }
            let level = entry.get_mut();
            self.fill_level(level, orders, taker, trades);
            if level.is_empty() {
                entry.remove();
            }
        }
    }

    /// Serve one level in FIFO order until it empties or the taker fills.
    fn fill_level(
        &self,
        level: &mut PriceLevel,
        orders: &mut HashMap<OrderId, SharedOrder>,
        taker: &SharedOrder,
        trades: &mut Vec<Trade>,
    ) {
        let level_price = level.price();
        while !level.is_empty() {
            let taker_remaining = {
                let taker = taker.read();
                if taker.is_fully_filled() {
                    break;
                }
                taker.remaining()
            };
            let Some(maker) = level.front() else {
                break;
            };

            // A maker that filled as a taker but has not been swept off the
            // book yet (limit fills are removed after their trades publish)
            // contributes nothing; evict it instead of emitting a zero-
            // quantity trade.
            let maker_remaining = maker.read().remaining();
            if maker_remaining == 0 {
                let maker_order_id = maker.read().order_id.clone();
                level.pop_front();
                orders.remove(&maker_order_id);
                level.refresh_total();
                continue;
            }

            let fill_quantity = taker_remaining.min(maker_remaining);
            let trade = self.new_trade(&maker, taker, level_price, fill_quantity);

            taker.write().fill(fill_quantity, level_price);
            let maker_filled = {
                let mut maker = maker.write();
                maker.fill(fill_quantity, level_price);
                maker.is_fully_filled()
            };

            if maker_filled {
                level.pop_front();
                orders.remove(&trade.maker_order_id);
            }
            level.refresh_total();

            trace!(
                symbol = %self.symbol,
                trade_id = %trade.trade_id,
                price = trade.price,
                quantity = trade.quantity,
                "trade executed"
            );
            trades.push(trade);
        }
    }

    fn new_trade(
        &self,
        maker: &SharedOrder,
        taker: &SharedOrder,
        price: Price,
        quantity: Quantity,
    ) -> Trade {
        let notional = Notional::from(price) * Notional::from(quantity);
        let maker_order_id = maker.read().order_id.clone();
        let (taker_order_id, aggressor_side) = {
            let taker = taker.read();
            (taker.order_id.clone(), taker.side)
        };

        Trade {
            trade_id: self.next_trade_id(),
            symbol: self.symbol.clone(),
            price,
            quantity,
            maker_order_id,
            taker_order_id,
            aggressor_side,
            timestamp: current_time_nanos(),
            maker_fee: self.fee_schedule.calculate_fee(notional, true),
            taker_fee: self.fee_schedule.calculate_fee(notional, false),
            maker_fee_bps: self.fee_schedule.maker_fee_bps,
            taker_fee_bps: self.fee_schedule.taker_fee_bps,
        }
    }

    fn next_trade_id(&self) -> TradeId {
        let counter = self.trade_ids.fetch_add(1, Ordering::Relaxed);
        format!(
            "{symbol}_{counter:0width$}",
            symbol = self.symbol,
            width = TRADE_ID_WIDTH
        )
    }

    /// Whether an FOK taker could fill completely against the current
    /// opposite side. Read-only; sums level aggregates best price first,
    /// stopping at the first level the taker cannot match.
    pub(crate) fn can_fill_fok(&self, order: &Order) -> bool {
        let ladder = self.ladder.lock();
        let mut remaining = order.quantity;

        match order.side {
            Side::Buy => {
                for (price, level) in ladder.asks.iter() {
                    if !order.can_match_at(*price) {
                        break;
                    }
                    remaining = remaining.saturating_sub(level.total_quantity());
                    if remaining == 0 {
                        return true;
                    }
                }
            }
            Side::Sell => {
                for (key, level) in ladder.bids.iter() {
                    if !order.can_match_at(key.0) {
                        break;
                    }
                    remaining = remaining.saturating_sub(level.total_quantity());
                    if remaining == 0 {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Validate the structural invariants that must hold between engine
    /// operations; panics on the first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let ladder = self.ladder.lock();

        assert_eq!(
            ladder.best_bid,
            ladder.bids.first_key_value().map(|(key, _)| key.0),
            "stale best bid cache"
        );
        assert_eq!(
            ladder.best_ask,
            ladder.asks.first_key_value().map(|(key, _)| *key),
            "stale best ask cache"
        );
        if let (Some(bid), Some(ask)) = (ladder.best_bid, ladder.best_ask) {
            assert!(bid < ask, "crossed book at rest: bid {bid} >= ask {ask}");
        }

        let mut resting = 0usize;
        for (key, level) in &ladder.bids {
            assert!(!level.is_empty(), "empty bid level retained at {}", key.0);
            let mut level_total: Quantity = 0;
            for order in level.iter() {
                let order = order.read();
                assert_eq!(order.side, Side::Buy);
                assert_eq!(order.price, key.0);
                assert!(
                    ladder.orders.contains_key(&order.order_id),
                    "bid {} missing from lookup",
                    order.order_id
                );
                level_total += order.remaining();
                resting += 1;
            }
            assert_eq!(level.total_quantity(), level_total, "bid aggregate drift");
        }
        for (key, level) in &ladder.asks {
            assert!(!level.is_empty(), "empty ask level retained at {key}");
            let mut level_total: Quantity = 0;
            for order in level.iter() {
                let order = order.read();
                assert_eq!(order.side, Side::Sell);
                assert_eq!(order.price, *key);
                assert!(
                    ladder.orders.contains_key(&order.order_id),
                    "ask {} missing from lookup",
                    order.order_id
                );
                level_total += order.remaining();
                resting += 1;
            }
            assert_eq!(level.total_quantity(), level_total, "ask aggregate drift");
        }
        assert_eq!(
            resting,
            ladder.orders.len(),
            "lookup and levels disagree on resting order count"
        );
    }
}
