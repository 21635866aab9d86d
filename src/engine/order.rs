//! The per-order record, its matching predicates, and the admission payload.

use crate::engine::types::{
    Notional, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol, Timestamp,
};
use crate::utils::current_time_nanos;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Shared handle to an order.
///
/// Orders are referenced from the engine-wide lookup and from their current
/// home (a book price level or the stop-order manager); the handle is the
/// reference-counted join point. Lock ordering: a book mutex may be held
/// while taking an order lock, never the reverse.
pub type SharedOrder = Arc<RwLock<Order>>;

/// A single trading order and its fill progress.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Engine-assigned (or caller-supplied) unique identifier.
    pub order_id: OrderId,
    /// Optional client identifier, echoed back untouched.
    pub client_order_id: Option<String>,
    /// The symbol this order trades.
    pub symbol: Symbol,
    /// Execution protocol. Rewritten in place when a stop order triggers.
    pub order_type: OrderType,
    /// Buy or sell.
    pub side: Side,
    /// Limit price in minor units; `0` for market and triggered-market orders.
    pub price: Price,
    /// Total order quantity.
    pub quantity: Quantity,
    /// Quantity executed so far.
    pub filled_quantity: Quantity,
    /// Sum of `price * quantity` over all fills; the exact accumulator
    /// behind [`Order::average_fill_price`].
    pub filled_notional: Notional,
    /// Trigger price for stop orders, `0` otherwise.
    pub stop_price: Price,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Nanosecond admission timestamp, audit only.
    pub created_at: Timestamp,
    /// Book insertion sequence for time priority at equal price.
    pub sequence: u64,
}

impl Order {
    /// Quantity still outstanding.
    #[must_use]
    #[inline]
    pub fn remaining(&self) -> Quantity {
        self.quantity.saturating_sub(self.filled_quantity)
    }

    /// True once nothing remains to execute.
    #[must_use]
    #[inline]
    pub fn is_fully_filled(&self) -> bool {
        self.remaining() == 0
    }

    /// True for the three conditional order types.
    #[must_use]
    #[inline]
    pub fn is_stop(&self) -> bool {
        self.order_type.is_stop()
    }

    /// Whether this order, as a taker, may execute against a resting level
    /// at `level_price`. Market orders match at any price; limit-style
    /// orders enforce the no-trade-through bound on their own side.
    #[must_use]
    pub fn can_match_at(&self, level_price: Price) -> bool {
        if self.order_type == OrderType::Market {
            return true;
        }
        match self.side {
            Side::Buy => self.price >= level_price,
            Side::Sell => self.price <= level_price,
        }
    }

    /// Record a fill of `quantity` at `price`.
    ///
    /// Updates the fill accumulator and flips the status to `FILLED` or
    /// `PARTIAL_FILL`. The final routing status (e.g. the cancelled
    /// remainder of an IOC) is applied by the engine router, not here.
    pub fn fill(&mut self, quantity: Quantity, price: Price) {
        self.filled_notional = self
            .filled_notional
            .saturating_add(Notional::from(price) * Notional::from(quantity));
        self.filled_quantity = self.filled_quantity.saturating_add(quantity);
        self.status = if self.is_fully_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartialFill
        };
    }

    /// Quantity-weighted average fill price in minor units, or `None`
    /// before the first fill.
    #[must_use]
    pub fn average_fill_price(&self) -> Option<f64> {
        if self.filled_quantity == 0 {
            return None;
        }
        Some(self.filled_notional as f64 / self.filled_quantity as f64)
    }

    /// Whether a stop order should activate given the last trade price.
    ///
    /// Stop-loss and stop-limit trigger with the market moving against the
    /// position: a buy when the price rises to the stop, a sell when it
    /// falls to it. Take-profit is the mirror image on each side.
    #[must_use]
    pub fn should_trigger(&self, last_trade_price: Price) -> bool {
        if !self.is_stop() || self.stop_price == 0 {
            return false;
        }
        match (self.order_type, self.side) {
            (OrderType::TakeProfit, Side::Buy) => last_trade_price <= self.stop_price,
            (OrderType::TakeProfit, Side::Sell) => last_trade_price >= self.stop_price,
            (_, Side::Buy) => last_trade_price >= self.stop_price,
            (_, Side::Sell) => last_trade_price <= self.stop_price,
        }
    }
}

impl From<NewOrder> for Order {
    fn from(request: NewOrder) -> Self {
        Order {
            order_id: request.order_id.unwrap_or_default(),
            client_order_id: request.client_order_id,
            symbol: request.symbol,
            order_type: request.order_type,
            side: request.side,
            price: request.price,
            quantity: request.quantity,
            filled_quantity: 0,
            filled_notional: 0,
            stop_price: request.stop_price,
            status: OrderStatus::Pending,
            created_at: current_time_nanos(),
            sequence: 0,
        }
    }
}

/// Admission payload for [`MatchingEngine::submit_order`].
///
/// [`MatchingEngine::submit_order`]: crate::MatchingEngine::submit_order
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct NewOrder {
    /// The symbol to trade. Required, non-empty.
    pub symbol: Symbol,
    /// Execution protocol.
    pub order_type: OrderType,
    /// Buy or sell.
    pub side: Side,
    /// Quantity, positive and at least the engine's minimum order size.
    pub quantity: Quantity,
    /// Limit price; must be positive for LIMIT/IOC/FOK/STOP_LIMIT and zero
    /// for MARKET/STOP_LOSS/TAKE_PROFIT.
    #[serde(default)]
    pub price: Price,
    /// Trigger price; must be positive for the three stop types.
    #[serde(default)]
    pub stop_price: Price,
    /// Optional client identifier, echoed on the order record.
    #[serde(default)]
    pub client_order_id: Option<String>,
    /// Caller-supplied order id; the engine assigns one when absent.
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

impl NewOrder {
    fn new(symbol: &str, order_type: OrderType, side: Side) -> Self {
        Self {
            symbol: symbol.to_string(),
            order_type,
            side,
            quantity: 0,
            price: 0,
            stop_price: 0,
            client_order_id: None,
            order_id: None,
        }
    }

    /// A limit order resting at `price` for `quantity`.
    #[must_use]
    pub fn limit(symbol: &str, side: Side, price: Price, quantity: Quantity) -> Self {
        let mut order = Self::new(symbol, OrderType::Limit, side);
        order.price = price;
        order.quantity = quantity;
        order
    }

    /// A market order for `quantity`.
    #[must_use]
    pub fn market(symbol: &str, side: Side, quantity: Quantity) -> Self {
        let mut order = Self::new(symbol, OrderType::Market, side);
        order.quantity = quantity;
        order
    }

    /// An immediate-or-cancel order bounded by `price`.
    #[must_use]
    pub fn ioc(symbol: &str, side: Side, price: Price, quantity: Quantity) -> Self {
        let mut order = Self::new(symbol, OrderType::Ioc, side);
        order.price = price;
        order.quantity = quantity;
        order
    }

    /// A fill-or-kill order bounded by `price`.
    #[must_use]
    pub fn fok(symbol: &str, side: Side, price: Price, quantity: Quantity) -> Self {
        let mut order = Self::new(symbol, OrderType::Fok, side);
        order.price = price;
        order.quantity = quantity;
        order
    }

    /// A stop-loss order triggering at `stop_price`, executing as a market
    /// order.
    #[must_use]
    pub fn stop_loss(symbol: &str, side: Side, stop_price: Price, quantity: Quantity) -> Self {
        let mut order = Self::new(symbol, OrderType::StopLoss, side);
        order.stop_price = stop_price;
        order.quantity = quantity;
        order
    }

    /// A stop-limit order triggering at `stop_price`, executing as a limit
    /// order at `limit_price`.
    #[must_use]
    pub fn stop_limit(
        symbol: &str,
        side: Side,
        stop_price: Price,
        limit_price: Price,
        quantity: Quantity,
    ) -> Self {
        let mut order = Self::new(symbol, OrderType::StopLimit, side);
        order.stop_price = stop_price;
        order.price = limit_price;
        order.quantity = quantity;
        order
    }

    /// A take-profit order triggering at `stop_price`, executing as a market
    /// order.
    #[must_use]
    pub fn take_profit(symbol: &str, side: Side, stop_price: Price, quantity: Quantity) -> Self {
        let mut order = Self::new(symbol, OrderType::TakeProfit, side);
        order.stop_price = stop_price;
        order.quantity = quantity;
        order
    }

    /// Attach a client order id, echoed on the resulting order record.
    #[must_use]
    pub fn with_client_order_id(mut self, client_order_id: &str) -> Self {
        self.client_order_id = Some(client_order_id.to_string());
        self
    }

    /// Supply the order id instead of letting the engine assign one.
    #[must_use]
    pub fn with_order_id(mut self, order_id: &str) -> Self {
        self.order_id = Some(order_id.to_string());
        self
    }
}
