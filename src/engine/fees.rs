//! Maker/taker fee schedule.

use crate::engine::types::{DEFAULT_MAKER_FEE_BPS, DEFAULT_TAKER_FEE_BPS, Notional};
use serde::{Deserialize, Serialize};

/// Configurable fee schedule for maker and taker fees.
///
/// Fees are expressed in basis points (bps), where 1 bps = 0.01% = 0.0001.
/// Negative values represent rebates (common for maker fees to reward
/// liquidity provision). The default schedule charges 10 bps maker / 20 bps
/// taker.
///
/// # Examples
///
/// ```
/// use matchbook_rs::FeeSchedule;
///
/// // 2 bps maker rebate, 5 bps taker fee
/// let schedule = FeeSchedule::new(-2, 5);
///
/// let notional = 10_000_000;
/// assert_eq!(schedule.calculate_fee(notional, false), 5_000);
/// assert_eq!(schedule.calculate_fee(notional, true), -2_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Maker fee in basis points (negative = rebate).
    pub maker_fee_bps: i32,

    /// Taker fee in basis points. Always at least the maker fee in a
    /// conventional maker/taker model, though this is not enforced.
    pub taker_fee_bps: i32,
}

impl FeeSchedule {
    /// Create a new fee schedule.
    ///
    /// # Arguments
    ///
    /// * `maker_fee_bps` - Maker fee in basis points (negative for rebates)
    /// * `taker_fee_bps` - Taker fee in basis points
    #[must_use = "FeeSchedule does nothing unless used"]
    pub fn new(maker_fee_bps: i32, taker_fee_bps: i32) -> Self {
        Self {
            maker_fee_bps,
            taker_fee_bps,
        }
    }

    /// Calculate the fee amount for one fill.
    ///
    /// # Arguments
    ///
    /// * `notional` - The notional value of the fill (price × quantity)
    /// * `is_maker` - true for the maker leg, false for the taker leg
    ///
    /// # Returns
    ///
    /// The fee in the same combined minor units as the notional. Positive
    /// values are charges, negative values are rebates.
    #[must_use = "Fee calculation result must be used"]
    #[inline]
    pub fn calculate_fee(&self, notional: Notional, is_maker: bool) -> i128 {
        let bps = if is_maker {
            self.maker_fee_bps
        } else {
            self.taker_fee_bps
        };
        (notional as i128)
            .checked_mul(bps as i128)
            .map(|product| product / 10_000)
            .unwrap_or(i128::MAX)
    }

    /// True if the maker side is paid a rebate rather than charged.
    #[must_use]
    #[inline]
    pub fn has_maker_rebate(&self) -> bool {
        self.maker_fee_bps < 0
    }

    /// True if both sides trade for free.
    #[must_use]
    #[inline]
    pub fn is_zero_fee(&self) -> bool {
        self.maker_fee_bps == 0 && self.taker_fee_bps == 0
    }

    /// A schedule with zero fees on both sides.
    #[must_use]
    pub fn zero_fee() -> Self {
        Self::new(0, 0)
    }

    /// A schedule charging only the taker side.
    #[must_use]
    pub fn taker_only(taker_fee_bps: i32) -> Self {
        Self::new(0, taker_fee_bps)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_MAKER_FEE_BPS, DEFAULT_TAKER_FEE_BPS)
    }
}
