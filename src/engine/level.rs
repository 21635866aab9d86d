//! A single price level: all orders resting at one price, FIFO.

use crate::engine::order::SharedOrder;
use crate::engine::types::{Price, Quantity};
use std::collections::VecDeque;

/// All orders resting at one price, in arrival order, with a maintained
/// aggregate of their remaining quantities.
///
/// The aggregate is kept equal to the sum of per-order remainings after
/// every mutation; [`PriceLevel::refresh_total`] recomputes it after the
/// front order takes a partial fill in place.
#[derive(Debug, Default)]
pub struct PriceLevel {
    price: Price,
    orders: VecDeque<SharedOrder>,
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create an empty level at `price`.
    #[must_use]
    pub(crate) fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: 0,
        }
    }

    /// The price shared by every order in this level.
    #[must_use]
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Aggregate remaining quantity across the level.
    #[must_use]
    #[inline]
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Number of orders queued at this price.
    #[must_use]
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// True when no orders rest here (the book erases empty levels).
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Append an order at the back of the queue.
    pub(crate) fn add(&mut self, order: SharedOrder) {
        self.total_quantity = self.total_quantity.saturating_add(order.read().remaining());
        self.orders.push_back(order);
    }

    /// Remove the order with `order_id`, wherever it sits in the queue.
    /// Returns whether it was found.
    pub(crate) fn remove(&mut self, order_id: &str) -> bool {
        let position = self
            .orders
            .iter()
            .position(|order| order.read().order_id == order_id);
        match position {
            Some(index) => {
                if let Some(order) = self.orders.remove(index) {
                    self.total_quantity =
                        self.total_quantity.saturating_sub(order.read().remaining());
                }
                true
            }
            None => false,
        }
    }

    /// The order at the head of the queue, next in time priority.
    #[must_use]
    pub(crate) fn front(&self) -> Option<SharedOrder> {
        self.orders.front().cloned()
    }

    /// Pop the head of the queue (used once the front order fills).
    pub(crate) fn pop_front(&mut self) -> Option<SharedOrder> {
        let order = self.orders.pop_front()?;
        self.total_quantity = self.total_quantity.saturating_sub(order.read().remaining());
        Some(order)
    }

    /// Recompute the aggregate from the current per-order remainings.
    pub(crate) fn refresh_total(&mut self) {
        self.total_quantity = self
            .orders
            .iter()
            .map(|order| order.read().remaining())
            .sum();
    }

    /// Iterate the queued orders in time priority.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &SharedOrder> {
        self.orders.iter()
    }
}
