//! A single price level in the order book.
//!
//! Orders at the same price are stored in FIFO order (time priority)
//! using a [`VecDeque`].

use std::collections::VecDeque;

use limitbook_types::{Order, OrderId};
use rust_decimal::Decimal;

/// One maker execution inside a level walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Execution {
    pub maker_order_id: OrderId,
    pub quantity: Decimal,
    pub maker_filled: bool,
}

/// A single price level containing all resting orders at that price.
///
/// Orders are stored in arrival order (FIFO) -- the front of the deque
/// has the highest time priority and will be filled first.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Decimal,
    orders: VecDeque<Order>,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    /// Insert behind every order with an equal or older priority.
    ///
    /// Freshly sequenced orders always land at the back; an order carrying
    /// an older priority slots in ahead of newer arrivals.
    pub(crate) fn insert(&mut self, order: Order) {
        let pos = self
            .orders
            .iter()
            .rposition(|o| o.priority() <= order.priority())
            .map_or(0, |p| p + 1);
        self.orders.insert(pos, order);
    }

    /// Peek at the front order without removing it.
    #[must_use]
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Orders oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Total remaining quantity across all orders at this level.
    #[must_use]
    pub fn total_quantity(&self) -> Decimal {
        self.orders.iter().map(Order::remaining_qty).sum()
    }

    /// Look up an order by ID.
    #[must_use]
    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id() == *order_id)
    }

    /// Remove a specific order by ID. Returns the removed order, or `None`.
    pub(crate) fn remove_order(&mut self, order_id: &OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.id() == *order_id)?;
        self.orders.remove(pos)
    }

    /// Fill `taker` against this level, oldest order first.
    ///
    /// Both sides are decremented with [`Order::apply_fill`], so neither
    /// priority moves. Makers that reach zero are popped. Stops when the
    /// taker is filled or the level is exhausted.
    pub(crate) fn match_incoming(&mut self, taker: &mut Order) -> Vec<Execution> {
        let mut executions = Vec::new();
        while !taker.is_filled() {
            let Some(maker) = self.orders.front_mut() else {
                break;
            };
            let quantity = taker.remaining_qty().min(maker.remaining_qty());
            taker.apply_fill(quantity);
            maker.apply_fill(quantity);

            let maker_filled = maker.is_filled();
            executions.push(Execution {
                maker_order_id: maker.id(),
                quantity,
                maker_filled,
            });
            if maker_filled {
                self.orders.pop_front();
            }
        }
        executions
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Order> + '_ {
        self.orders.drain(..)
    }

    /// Returns `true` if there are no orders at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}
