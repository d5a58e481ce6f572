//! Fill records produced by the matching engine.
//!
//! A [`Fill`] is the immutable record of one execution between the
//! incoming (taker) order and one resting (maker) order, at the maker's
//! price level.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{FillId, OrderId, OrderSide};

/// A single taker/maker execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Deterministic from the taker's priority and the fill index.
    pub id: FillId,
    /// The incoming order.
    pub taker_order_id: OrderId,
    /// The resting order.
    pub maker_order_id: OrderId,
    /// Which side the taker was on.
    pub taker_side: OrderSide,
    /// Execution price (the maker's level).
    pub price: Decimal,
    /// Executed quantity.
    pub quantity: Decimal,
    /// `true` if the maker left the book with this fill.
    pub maker_filled: bool,
    pub executed_at: DateTime<Utc>,
}

impl Fill {
    /// Price × quantity.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }

    #[must_use]
    pub fn taker_is_buyer(&self) -> bool {
        self.taker_side == OrderSide::Buy
    }
}

impl std::fmt::Display for Fill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fill[{}] taker {} {} {} @ {} vs maker {}",
            self.id,
            self.taker_side,
            self.taker_order_id,
            self.quantity,
            self.price,
            self.maker_order_id,
        )
    }
}
