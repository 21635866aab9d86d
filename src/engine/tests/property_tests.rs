//! Randomized invariant sweeps over the book and the FOK protocol.

use super::helpers::SYMBOL;
use crate::engine::core::MatchingEngine;
use crate::engine::order::NewOrder;
use crate::engine::types::{OrderId, OrderStatus, Quantity, Side};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any interleaving of limit submissions and cancellations leaves the
    /// book structurally consistent: aggregates match, caches are fresh,
    /// the lookup and the levels agree, and the book is never crossed at
    /// rest.
    #[test]
    fn random_limit_flow_preserves_book_invariants(
        ops in proptest::collection::vec(
            (any::<bool>(), 0u8..20, 1u8..50, any::<bool>()),
            1..60,
        )
    ) {
        let engine = MatchingEngine::new();
        let mut submitted: Vec<OrderId> = Vec::new();

        for (is_buy, price_offset, quantity, cancel) in ops {
            if cancel && !submitted.is_empty() {
                let index = price_offset as usize % submitted.len();
                let _ = engine.cancel_order(&submitted[index]);
            } else {
                let side = if is_buy { Side::Buy } else { Side::Sell };
                let price = 10_000 + u64::from(price_offset) * 10;
                let order_id = engine
                    .submit_order(NewOrder::limit(SYMBOL, side, price, u64::from(quantity)))
                    .unwrap();
                submitted.push(order_id);
            }

            if let Some(book) = engine.order_book(SYMBOL) {
                book.assert_invariants();
            }
        }

        for order_id in &submitted {
            let order = engine.get_order(order_id).unwrap();
            prop_assert!(order.filled_quantity <= order.quantity);
            match order.status {
                OrderStatus::Filled => prop_assert_eq!(order.remaining(), 0),
                OrderStatus::Active => prop_assert_eq!(order.filled_quantity, 0),
                _ => {}
            }
        }
    }

    /// FOK either fills exactly its quantity or executes nothing,
    /// whatever the shape of the opposite side.
    #[test]
    fn fok_is_all_or_nothing(
        levels in proptest::collection::vec((0u8..20, 1u8..50), 0..10),
        want in 1u16..500,
    ) {
        let engine = MatchingEngine::new();
        let mut available: Quantity = 0;

        for (price_offset, quantity) in levels {
            let price = 10_000 + u64::from(price_offset) * 10;
            engine
                .submit_order(NewOrder::limit(
                    SYMBOL,
                    Side::Sell,
                    price,
                    u64::from(quantity),
                ))
                .unwrap();
            available += u64::from(quantity);
        }

        // Limit above every seeded level: feasibility is purely about size.
        let order_id = engine
            .submit_order(NewOrder::fok(SYMBOL, Side::Buy, 10_500, u64::from(want)))
            .unwrap();
        let order = engine.get_order(&order_id).unwrap();

        if available >= u64::from(want) {
            prop_assert_eq!(order.status, OrderStatus::Filled);
            prop_assert_eq!(order.filled_quantity, u64::from(want));
        } else {
            prop_assert_eq!(order.status, OrderStatus::Cancelled);
            prop_assert_eq!(order.filled_quantity, 0);
        }

        if let Some(book) = engine.order_book(SYMBOL) {
            book.assert_invariants();
        }
    }
}
