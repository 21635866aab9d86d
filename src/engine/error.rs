//! Engine error types.
//!
//! Every variant is terminal for the order that caused it: validation
//! failures reject the order outright and nothing is retried. Liquidity
//! shortfalls are not errors — they surface as `CANCELLED` /
//! `PARTIAL_FILL` statuses on the order itself.

use crate::engine::types::{OrderType, Price, Quantity};
use thiserror::Error;

/// Errors surfaced by order admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The order named no trading symbol.
    #[error("symbol required")]
    SymbolRequired,

    /// Quantity was zero.
    #[error("quantity must be positive")]
    NonPositiveQuantity,

    /// Quantity was below the configured minimum order size.
    #[error("quantity {quantity} below minimum order size {min}")]
    QuantityBelowMinimum {
        /// The rejected quantity.
        quantity: Quantity,
        /// The configured minimum.
        min: Quantity,
    },

    /// A priced order type (LIMIT, IOC, FOK, STOP_LIMIT) came without a
    /// positive limit price.
    #[error("{order_type} orders require a positive limit price")]
    LimitPriceRequired {
        /// The order type that failed validation.
        order_type: OrderType,
    },

    /// An unpriced order type (MARKET, STOP_LOSS, TAKE_PROFIT) carried a
    /// limit price.
    #[error("{order_type} orders must not specify a price (got {price})")]
    PriceForbidden {
        /// The order type that failed validation.
        order_type: OrderType,
        /// The offending price.
        price: Price,
    },

    /// A stop order came without a positive stop price.
    #[error("{order_type} orders require a positive stop price")]
    StopPriceRequired {
        /// The order type that failed validation.
        order_type: OrderType,
    },

    /// An order type string could not be parsed.
    #[error("unknown order type: {0}")]
    UnknownOrderType(String),

    /// An order side string could not be parsed.
    #[error("unknown order side: {0}")]
    UnknownSide(String),
}
