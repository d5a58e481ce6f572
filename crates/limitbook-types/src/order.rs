//! Order types for the limitbook order book.
//!
//! An [`Order`] only changes through two mutators: [`Order::apply_fill`]
//! (matching, keeps time priority) and [`Order::apply_modify`] (manual
//! amendment, takes a fresh priority). The book holds the canonical copy of
//! every resting order, so applying either to a caller-held clone has no
//! effect on the book.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, Priority};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side whose liquidity this side consumes.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    side: OrderSide,
    price: Decimal,
    /// Size as last set by construction or modify.
    quantity: Decimal,
    /// Open size. Decremented by fills, replaced by modify.
    remaining_qty: Decimal,
    priority: Priority,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order with an explicit priority.
    ///
    /// Most callers should go through `OrderBook::new_order`, which
    /// validates the price and quantity and draws the priority from the
    /// book's sequencer.
    #[must_use]
    pub fn new(side: OrderSide, price: Decimal, quantity: Decimal, priority: Priority) -> Self {
        Self {
            id: OrderId::new(),
            side,
            price,
            quantity,
            remaining_qty: quantity,
            priority,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> OrderId {
        self.id
    }

    #[must_use]
    pub fn side(&self) -> OrderSide {
        self.side
    }

    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    #[must_use]
    pub fn remaining_qty(&self) -> Decimal {
        self.remaining_qty
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether this order's limit permits trading at a resting `price` on
    /// the opposite side.
    #[must_use]
    pub fn crosses(&self, price: Decimal) -> bool {
        match self.side {
            OrderSide::Buy => self.price >= price,
            OrderSide::Sell => self.price <= price,
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining_qty.is_zero()
    }

    #[must_use]
    pub fn filled_qty(&self) -> Decimal {
        self.quantity - self.remaining_qty
    }

    /// Execute `qty` against this order. Time priority is kept.
    ///
    /// `qty` is clamped to the open size so `remaining_qty` never goes
    /// negative.
    pub fn apply_fill(&mut self, qty: Decimal) {
        self.remaining_qty -= qty.min(self.remaining_qty);
    }

    /// Replace the size (and optionally the price) and move the order to
    /// `priority`, normally the back of the queue.
    pub fn apply_modify(&mut self, quantity: Decimal, price: Option<Decimal>, priority: Priority) {
        self.quantity = quantity;
        self.remaining_qty = quantity;
        if let Some(price) = price {
            self.price = price;
        }
        self.priority = priority;
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// Limit order with priority 0 and whole-unit price and quantity.
    pub fn dummy_limit(side: OrderSide, price: i64, qty: i64) -> Self {
        Self::new(side, Decimal::new(price, 0), Decimal::new(qty, 0), Priority(0))
    }
}
