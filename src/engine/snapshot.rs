//! Depth snapshots of an order book for market data consumers.

use crate::engine::types::{Price, Quantity, Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One aggregated price level as seen from outside: price and total
/// remaining quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Level price in minor units.
    pub price: Price,
    /// Sum of remaining quantities of every order at this price.
    pub quantity: Quantity,
}

/// A stable snapshot of the top of a book, taken under the book lock.
///
/// `bids` are in descending price order and `asks` in ascending price
/// order, i.e. best first on both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// The symbol this snapshot describes.
    pub symbol: Symbol,
    /// Nanosecond capture timestamp.
    pub timestamp: Timestamp,
    /// Bid levels, best (highest) first.
    pub bids: Vec<DepthLevel>,
    /// Ask levels, best (lowest) first.
    pub asks: Vec<DepthLevel>,
}

impl BookSnapshot {
    /// Best bid level, if any.
    ///
    /// Scans rather than trusting element order so snapshots that round-trip
    /// through serialization stay correct.
    #[must_use]
    pub fn best_bid(&self) -> Option<DepthLevel> {
        self.bids.iter().copied().max_by_key(|level| level.price)
    }

    /// Best ask level, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<DepthLevel> {
        self.asks.iter().copied().min_by_key(|level| level.price)
    }

    /// Midpoint of the best bid and ask, in minor units.
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price as f64 + ask.price as f64) / 2.0),
            _ => None,
        }
    }

    /// Best ask minus best bid, in minor units.
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price.saturating_sub(bid.price)),
            _ => None,
        }
    }

    /// Total visible quantity on the bid side.
    #[must_use]
    pub fn total_bid_volume(&self) -> Quantity {
        self.bids
            .iter()
            .fold(0u64, |acc, level| acc.saturating_add(level.quantity))
    }

    /// Total visible quantity on the ask side.
    #[must_use]
    pub fn total_ask_volume(&self) -> Quantity {
        self.asks
            .iter()
            .fold(0u64, |acc, level| acc.saturating_add(level.quantity))
    }

    /// SHA-256 integrity checksum over the canonical JSON encoding,
    /// hex-encoded. Two snapshots with identical contents produce the same
    /// checksum regardless of when they were computed.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if JSON encoding fails.
    pub fn checksum(&self) -> Result<String, serde_json::Error> {
        let encoded = serde_json::to_string(self)?;
        let digest = Sha256::digest(encoded.as_bytes());
        Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> BookSnapshot {
        BookSnapshot {
            symbol: "BTC-USDT".to_string(),
            timestamp: 42,
            bids: vec![
                DepthLevel {
                    price: 5_000_000,
                    quantity: 100,
                },
                DepthLevel {
                    price: 4_990_000,
                    quantity: 250,
                },
            ],
            asks: vec![
                DepthLevel {
                    price: 5_010_000,
                    quantity: 80,
                },
                DepthLevel {
                    price: 5_020_000,
                    quantity: 40,
                },
            ],
        }
    }

    #[test]
    fn derived_metrics() {
        let snapshot = snapshot();
        assert_eq!(snapshot.best_bid().unwrap().price, 5_000_000);
        assert_eq!(snapshot.best_ask().unwrap().price, 5_010_000);
        assert_eq!(snapshot.spread(), Some(10_000));
        assert_eq!(snapshot.mid_price(), Some(5_005_000.0));
        assert_eq!(snapshot.total_bid_volume(), 350);
        assert_eq!(snapshot.total_ask_volume(), 120);
    }

    #[test]
    fn empty_sides_yield_none() {
        let snapshot = BookSnapshot {
            symbol: "BTC-USDT".to_string(),
            timestamp: 0,
            bids: Vec::new(),
            asks: Vec::new(),
        };
        assert!(snapshot.best_bid().is_none());
        assert!(snapshot.best_ask().is_none());
        assert!(snapshot.mid_price().is_none());
        assert!(snapshot.spread().is_none());
    }

    #[test]
    fn checksum_is_deterministic_and_content_sensitive() {
        let a = snapshot();
        let b = snapshot();
        assert_eq!(a.checksum().unwrap(), b.checksum().unwrap());

        let mut c = snapshot();
        c.bids[0].quantity += 1;
        assert_ne!(a.checksum().unwrap(), c.checksum().unwrap());
    }

    #[test]
    fn round_trips_through_json() {
        let snapshot = snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: BookSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.bids, snapshot.bids);
        assert_eq!(decoded.asks, snapshot.asks);
    }
}
