//! Shared domain scalars, enums and numeric policy for the matching engine.
//!
//! Prices and quantities are unsigned integers in fixed minor units, so every
//! comparison in the matching path is exact. Prices carry two implied
//! decimals ([`PRICE_SCALE`]), quantities eight ([`QTY_SCALE`]); a price of
//! `0` means "unpriced" and only appears on market orders and triggered
//! stop-market orders.

use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trading symbol identifier (e.g. `"BTC-USDT"`).
pub type Symbol = String;

/// Price in minor units with two implied decimals (`50_000.00` = `5_000_000`).
pub type Price = u64;

/// Quantity in base-asset units with eight implied decimals (`1.0` = `100_000_000`).
pub type Quantity = u64;

/// Notional value of a fill: `price * quantity` in combined minor units.
pub type Notional = u128;

/// Unique order identifier. Engine-assigned ids have the form
/// `ORD` + zero-padded counter of width [`ORDER_ID_WIDTH`].
pub type OrderId = String;

/// Unique trade identifier, `<symbol>_` + zero-padded per-book counter
/// of width [`TRADE_ID_WIDTH`].
pub type TradeId = String;

/// Wall-clock nanoseconds since the Unix epoch. Captured at order and trade
/// construction; used for audit only, never for matching priority.
pub type Timestamp = u64;

/// Implied decimal scale of [`Price`] values.
pub const PRICE_SCALE: u64 = 100;

/// Implied decimal scale of [`Quantity`] values.
pub const QTY_SCALE: u64 = 100_000_000;

/// Smallest admissible order quantity, in quantity units.
pub const MIN_ORDER_SIZE: Quantity = 1;

/// Default maker fee in basis points (0.1%).
pub const DEFAULT_MAKER_FEE_BPS: i32 = 10;

/// Default taker fee in basis points (0.2%).
pub const DEFAULT_TAKER_FEE_BPS: i32 = 20;

/// Digits in an engine-assigned order id counter.
pub const ORDER_ID_WIDTH: usize = 12;

/// Digits in a per-book trade id counter.
pub const TRADE_ID_WIDTH: usize = 10;

/// Which side of the book an order sits on or takes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid side.
    Buy,
    /// Ask side.
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    #[must_use]
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(EngineError::UnknownSide(s.to_string())),
        }
    }
}

/// The execution protocol an order follows through the engine.
///
/// The first four are executable on arrival; the stop variants are parked in
/// the stop-order manager and rewritten to `Market` or `Limit` when their
/// trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Match at any price, never rest. Remainder is discarded.
    Market,
    /// Match what crosses, rest the remainder at the limit price.
    Limit,
    /// Immediate-or-cancel: match what crosses now, discard the rest.
    Ioc,
    /// Fill-or-kill: fill entirely right now or emit no trades at all.
    Fok,
    /// Conditional order that becomes a `Market` order when triggered.
    StopLoss,
    /// Conditional order that becomes a `Limit` order when triggered.
    StopLimit,
    /// Profit-taking conditional; becomes a `Market` order when triggered.
    TakeProfit,
}

impl OrderType {
    /// True for the three conditional types held by the stop-order manager.
    #[must_use]
    #[inline]
    pub fn is_stop(self) -> bool {
        matches!(
            self,
            OrderType::StopLoss | OrderType::StopLimit | OrderType::TakeProfit
        )
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::Ioc => "IOC",
            OrderType::Fok => "FOK",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::StopLimit => "STOP_LIMIT",
            OrderType::TakeProfit => "TAKE_PROFIT",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OrderType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            "ioc" => Ok(OrderType::Ioc),
            "fok" => Ok(OrderType::Fok),
            "stop_loss" | "stop-loss" => Ok(OrderType::StopLoss),
            "stop_limit" | "stop-limit" => Ok(OrderType::StopLimit),
            "take_profit" | "take-profit" => Ok(OrderType::TakeProfit),
            _ => Err(EngineError::UnknownOrderType(s.to_string())),
        }
    }
}

/// Lifecycle state of an order.
///
/// Progresses `Pending -> (Active -> PartialFill)* -> {Filled, Cancelled,
/// Rejected}`; the three terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created but not yet resting or executed (all stop orders wait here).
    Pending,
    /// Resting on a book with no fills yet.
    Active,
    /// At least one fill, remainder outstanding (or discarded for IOC/market).
    PartialFill,
    /// Fully executed.
    Filled,
    /// Removed by the user, or the unexecuted remainder of an IOC, FOK or
    /// starved market order.
    Cancelled,
    /// Failed admission validation.
    Rejected,
}

impl OrderStatus {
    /// True once no further transition is possible.
    #[must_use]
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Active => "ACTIVE",
            OrderStatus::PartialFill => "PARTIAL_FILL",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        };
        write!(f, "{name}")
    }
}
