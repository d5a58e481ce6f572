//! Book configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LimitbookError, MarketPair, Result, constants};

/// Per-book configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// The instrument this book serves.
    pub market: MarketPair,
    /// Tick size (price granularity).
    pub tick_size: Decimal,
    /// Lot size (quantity granularity).
    pub lot_size: Decimal,
}

impl Default for BookConfig {
    /// BTC/USDT with the finest tick and lot the precision constants allow.
    fn default() -> Self {
        Self {
            market: MarketPair::new("BTC", "USDT"),
            tick_size: Decimal::new(1, constants::PRICE_PRECISION),
            lot_size: Decimal::new(1, constants::QTY_PRECISION),
        }
    }
}

impl BookConfig {
    /// BTC/USDT with exchange-style granularity.
    #[must_use]
    pub fn btc_usdt() -> Self {
        Self {
            market: MarketPair::new("BTC", "USDT"),
            tick_size: Decimal::new(1, 2), // 0.01 USDT
            lot_size: Decimal::new(1, 5),  // 0.00001 BTC
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_size <= Decimal::ZERO {
            return Err(LimitbookError::Configuration(format!(
                "tick_size must be positive, got {}",
                self.tick_size
            )));
        }
        if self.lot_size <= Decimal::ZERO {
            return Err(LimitbookError::Configuration(format!(
                "lot_size must be positive, got {}",
                self.lot_size
            )));
        }
        Ok(())
    }

    /// Reject a limit price that is non-positive or off-tick.
    pub fn check_price(&self, price: Decimal) -> Result<()> {
        if price <= Decimal::ZERO {
            return Err(LimitbookError::invalid(format!(
                "price must be positive, got {price}"
            )));
        }
        if !(price % self.tick_size).is_zero() {
            return Err(LimitbookError::invalid(format!(
                "price {price} is not a multiple of tick size {}",
                self.tick_size
            )));
        }
        Ok(())
    }

    /// Reject a negative or off-lot quantity. Zero passes only when
    /// `allow_zero` is set (modify-to-zero removes the order).
    pub fn check_quantity(&self, qty: Decimal, allow_zero: bool) -> Result<()> {
        if qty < Decimal::ZERO {
            return Err(LimitbookError::invalid(format!(
                "quantity must not be negative, got {qty}"
            )));
        }
        if qty.is_zero() {
            return if allow_zero {
                Ok(())
            } else {
                Err(LimitbookError::invalid("quantity must be positive"))
            };
        }
        if !(qty % self.lot_size).is_zero() {
            return Err(LimitbookError::invalid(format!(
                "quantity {qty} is not a multiple of lot size {}",
                self.lot_size
            )));
        }
        Ok(())
    }
}
