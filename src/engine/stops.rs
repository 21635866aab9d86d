//! Holding pen for conditional orders awaiting their trigger price.

use crate::engine::order::SharedOrder;
use crate::engine::types::{OrderStatus, OrderType, Price, Symbol};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Holds stop, stop-limit and take-profit orders off-book until an executed
/// trade crosses their stop price.
///
/// Pending orders are kept per symbol in admission order; a trigger pass
/// drains matching orders in that order and rewrites each into its
/// executable successor type before handing it back to the router. The
/// trigger predicate depends only on observed trade prices, never on book
/// state, so the book never learns about conditional orders.
#[derive(Debug, Default)]
pub struct StopOrderManager {
    pending: Mutex<HashMap<Symbol, Vec<SharedOrder>>>,
}

impl StopOrderManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a stop order until its trigger fires. The order's status
    /// becomes `PENDING`.
    ///
    /// Orders that are not conditional, or that carry no stop price, are
    /// refused (they could never trigger and would pend forever).
    pub fn add(&self, order: &SharedOrder) {
        let symbol = {
            let mut order = order.write();
            if !order.is_stop() || order.stop_price == 0 {
                error!(
                    order_id = %order.order_id,
                    order_type = %order.order_type,
                    "refusing non-stop order"
                );
                return;
            }
            order.status = OrderStatus::Pending;
            info!(
                order_id = %order.order_id,
                order_type = %order.order_type,
                stop_price = order.stop_price,
                "stop order pending trigger"
            );
            order.symbol.clone()
        };

        self.pending
            .lock()
            .entry(symbol)
            .or_default()
            .push(Arc::clone(order));
    }

    /// Collect every pending order for `symbol` triggered by
    /// `last_trade_price`, in admission order.
    ///
    /// Triggered orders are removed from the pending set and rewritten in
    /// place: stop-loss and take-profit become market orders (price 0),
    /// stop-limit becomes a limit order at its stored limit price. The
    /// caller re-routes each returned order.
    pub fn check_triggers(&self, symbol: &str, last_trade_price: Price) -> Vec<SharedOrder> {
        let mut pending = self.pending.lock();
        let Some(orders) = pending.get_mut(symbol) else {
            return Vec::new();
        };

        let mut triggered = Vec::new();
        let mut index = 0;
        while index < orders.len() {
            if orders[index].read().should_trigger(last_trade_price) {
                let order = orders.remove(index);
                {
                    let mut order = order.write();
                    info!(
                        order_id = %order.order_id,
                        order_type = %order.order_type,
                        stop_price = order.stop_price,
                        last_trade_price,
                        "stop order triggered"
                    );
                    match order.order_type {
                        OrderType::StopLoss | OrderType::TakeProfit => {
                            order.order_type = OrderType::Market;
                            order.price = 0;
                        }
                        OrderType::StopLimit => {
                            order.order_type = OrderType::Limit;
                        }
                        _ => {}
                    }
                }
                triggered.push(order);
            } else {
                index += 1;
            }
        }

        if orders.is_empty() {
            pending.remove(symbol);
        }
        triggered
    }

    /// Cancel a pending stop order by id, searching every symbol. Returns
    /// whether it was found; the order becomes `CANCELLED`.
    pub fn cancel(&self, order_id: &str) -> bool {
        let mut pending = self.pending.lock();
        for (symbol, orders) in pending.iter_mut() {
            let position = orders
                .iter()
                .position(|order| order.read().order_id == order_id);
            if let Some(index) = position {
                let order = orders.remove(index);
                order.write().status = OrderStatus::Cancelled;
                debug!(order_id, %symbol, "pending stop order cancelled");
                return true;
            }
        }
        false
    }

    /// Handles to the pending stop orders for `symbol`, in admission order.
    #[must_use]
    pub fn stop_orders(&self, symbol: &str) -> Vec<SharedOrder> {
        self.pending
            .lock()
            .get(symbol)
            .map(|orders| orders.to_vec())
            .unwrap_or_default()
    }

    /// Total pending stop orders across all symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().values().map(Vec::len).sum()
    }

    /// True when no stop orders are pending anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::order::{NewOrder, Order};
    use crate::engine::types::Side;
    use parking_lot::RwLock;

    fn pending_stop(order_id: &str, request: NewOrder) -> SharedOrder {
        let mut order = Order::from(request);
        order.order_id = order_id.to_string();
        Arc::new(RwLock::new(order))
    }

    #[test]
    fn add_marks_pending_and_counts() {
        let manager = StopOrderManager::new();
        assert!(manager.is_empty());

        let order = pending_stop("s1", NewOrder::stop_loss("BTC-USDT", Side::Sell, 9_500, 100));
        manager.add(&order);

        assert_eq!(manager.len(), 1);
        assert_eq!(order.read().status, OrderStatus::Pending);
        assert_eq!(manager.stop_orders("BTC-USDT").len(), 1);
        assert!(manager.stop_orders("ETH-USDT").is_empty());
    }

    #[test]
    fn refuses_orders_that_could_never_trigger() {
        let manager = StopOrderManager::new();

        let plain_limit = pending_stop("l1", NewOrder::limit("BTC-USDT", Side::Sell, 9_500, 100));
        manager.add(&plain_limit);

        let unpriced_stop = pending_stop("s1", NewOrder::stop_loss("BTC-USDT", Side::Sell, 0, 100));
        manager.add(&unpriced_stop);

        assert!(manager.is_empty());
    }

    #[test]
    fn trigger_converts_stop_loss_to_market() {
        let manager = StopOrderManager::new();
        let order = pending_stop("s1", NewOrder::stop_loss("BTC-USDT", Side::Sell, 9_500, 100));
        manager.add(&order);

        assert!(manager.check_triggers("BTC-USDT", 9_600).is_empty());
        assert_eq!(manager.len(), 1);

        let triggered = manager.check_triggers("BTC-USDT", 9_500);
        assert_eq!(triggered.len(), 1);
        assert!(manager.is_empty());

        let order = triggered[0].read();
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.price, 0);
    }

    #[test]
    fn trigger_converts_stop_limit_keeping_limit_price() {
        let manager = StopOrderManager::new();
        let order = pending_stop(
            "s1",
            NewOrder::stop_limit("BTC-USDT", Side::Sell, 9_500, 9_450, 100),
        );
        manager.add(&order);

        let triggered = manager.check_triggers("BTC-USDT", 9_400);
        assert_eq!(triggered.len(), 1);

        let order = triggered[0].read();
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.price, 9_450);
    }

    #[test]
    fn triggers_drain_in_admission_order() {
        let manager = StopOrderManager::new();
        for id in ["s1", "s2", "s3"] {
            manager.add(&pending_stop(
                id,
                NewOrder::stop_loss("BTC-USDT", Side::Sell, 9_500, 100),
            ));
        }

        let triggered = manager.check_triggers("BTC-USDT", 9_400);
        let ids: Vec<String> = triggered
            .iter()
            .map(|order| order.read().order_id.clone())
            .collect();
        assert_eq!(ids, ["s1", "s2", "s3"]);
    }

    #[test]
    fn cancel_removes_exactly_once() {
        let manager = StopOrderManager::new();
        let order = pending_stop("s1", NewOrder::take_profit("BTC-USDT", Side::Buy, 9_500, 100));
        manager.add(&order);

        assert!(manager.cancel("s1"));
        assert_eq!(order.read().status, OrderStatus::Cancelled);
        assert!(manager.is_empty());
        assert!(!manager.cancel("s1"));
    }

    #[test]
    fn cancel_searches_across_symbols() {
        let manager = StopOrderManager::new();
        manager.add(&pending_stop(
            "btc",
            NewOrder::stop_loss("BTC-USDT", Side::Sell, 9_500, 100),
        ));
        manager.add(&pending_stop(
            "eth",
            NewOrder::stop_loss("ETH-USDT", Side::Sell, 300, 100),
        ));

        assert!(manager.cancel("eth"));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.stop_orders("BTC-USDT").len(), 1);
    }
}
