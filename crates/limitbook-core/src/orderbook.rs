//! The limit-order book for a single instrument.
//!
//! Uses `BTreeMap` for price-level ordering:
//! - **Bids** (buys): `BTreeMap<Reverse<Decimal>, PriceLevel>` -- highest price first
//! - **Asks** (sells): `BTreeMap<Decimal, PriceLevel>` -- lowest price first
//!
//! An auxiliary `HashMap<OrderId, (Side, Price)>` turns delete and modify
//! into a level lookup instead of a scan over every resting order.
//!
//! Time priority comes from a sequencer owned by the book: every
//! [`OrderBook::new_order`] and every modify draws the next [`Priority`].

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use limitbook_types::constants;
use limitbook_types::*;
use rust_decimal::Decimal;

use crate::price_level::{Execution, PriceLevel};

/// The order book for a single instrument.
#[derive(Debug, Clone)]
pub struct OrderBook {
    config: BookConfig,
    /// Buy side: highest price first (`Reverse` key).
    bids: BTreeMap<Reverse<Decimal>, PriceLevel>,
    /// Sell side: lowest price first.
    asks: BTreeMap<Decimal, PriceLevel>,
    /// Fast lookup: `OrderId -> (side, price)`.
    index: HashMap<OrderId, (OrderSide, Decimal)>,
    /// Next priority the sequencer will issue.
    next_priority: Priority,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty book with [`BookConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(BookConfig::default())
    }

    /// Create an empty book, rejecting an invalid config.
    pub fn with_config(config: BookConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: BookConfig) -> Self {
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            market = %config.market,
            tick = %config.tick_size,
            lot = %config.lot_size,
            "Order book created"
        );
        Self {
            config,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            next_priority: Priority::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    #[must_use]
    pub fn market(&self) -> &MarketPair {
        &self.config.market
    }

    fn issue_priority(&mut self) -> Result<Priority> {
        let priority = self.next_priority;
        self.next_priority = priority
            .checked_next()
            .ok_or_else(|| LimitbookError::invalid("priority sequence exhausted"))?;
        Ok(priority)
    }

    // =================================================================
    // Construction
    // =================================================================

    /// Validate and build a new limit order, assigning a fresh ID and the
    /// next priority.
    ///
    /// The order is not added; hand it to [`OrderBook::add`] or to the
    /// matching engine.
    pub fn new_order(&mut self, side: OrderSide, price: Decimal, quantity: Decimal) -> Result<Order> {
        self.config.check_price(price)?;
        self.config.check_quantity(quantity, false)?;
        let priority = self.issue_priority()?;
        Ok(Order::new(side, price, quantity, priority))
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Rest an order at its price, behind every order with an equal or
    /// older priority.
    ///
    /// Fails for an ID that is already resting, an order without a positive
    /// price and remaining quantity, or a priority at the end of the
    /// sequence. The book is untouched on error.
    pub fn add(&mut self, order: Order) -> Result<()> {
        if self.index.contains_key(&order.id()) {
            return Err(LimitbookError::DuplicateOrder(order.id()));
        }
        check_open(&order)?;

        // Keep the sequencer ahead of priorities issued elsewhere.
        if order.priority() >= self.next_priority {
            self.next_priority = order
                .priority()
                .checked_next()
                .ok_or_else(|| LimitbookError::invalid("priority sequence exhausted"))?;
        }

        tracing::debug!(
            order = %order.id(),
            side = %order.side(),
            price = %order.price(),
            qty = %order.remaining_qty(),
            priority = %order.priority(),
            "Order added"
        );
        self.place(order);
        Ok(())
    }

    fn place(&mut self, order: Order) {
        let (id, side, price) = (order.id(), order.side(), order.price());
        self.index.insert(id, (side, price));
        match side {
            OrderSide::Buy => {
                self.bids
                    .entry(Reverse(price))
                    .or_insert_with(|| PriceLevel::new(price))
                    .insert(order);
            }
            OrderSide::Sell => {
                self.asks
                    .entry(price)
                    .or_insert_with(|| PriceLevel::new(price))
                    .insert(order);
            }
        }
    }

    // =================================================================
    // Deletion / modification
    // =================================================================

    /// Remove an order by ID and return it. Drops its price level if the
    /// level becomes empty.
    pub fn delete(&mut self, order_id: &OrderId) -> Result<Order> {
        let Some((side, price)) = self.index.remove(order_id) else {
            tracing::debug!(order = %order_id, "Delete: order not found");
            return Err(LimitbookError::OrderNotFound(*order_id));
        };

        let order = self
            .take(side, price, order_id)
            .ok_or(LimitbookError::OrderNotFound(*order_id))?;

        tracing::debug!(order = %order_id, side = %side, price = %price, "Order deleted");
        Ok(order)
    }

    fn take(&mut self, side: OrderSide, price: Decimal, order_id: &OrderId) -> Option<Order> {
        match side {
            OrderSide::Buy => {
                let level = self.bids.get_mut(&Reverse(price))?;
                let order = level.remove_order(order_id)?;
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
                Some(order)
            }
            OrderSide::Sell => {
                let level = self.asks.get_mut(&price)?;
                let order = level.remove_order(order_id)?;
                if level.is_empty() {
                    self.asks.remove(&price);
                }
                Some(order)
            }
        }
    }

    /// Replace an order's quantity. The order loses its queue position.
    ///
    /// Returns the order as it now rests. A quantity of zero removes the
    /// order and returns it as removed.
    pub fn modify(&mut self, order_id: &OrderId, quantity: Decimal) -> Result<Order> {
        self.amend(order_id, quantity, None)
    }

    /// Replace an order's quantity and price. The order moves to the back
    /// of the queue at the new price.
    pub fn modify_with_price(
        &mut self,
        order_id: &OrderId,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Order> {
        self.amend(order_id, quantity, Some(price))
    }

    fn amend(&mut self, order_id: &OrderId, quantity: Decimal, price: Option<Decimal>) -> Result<Order> {
        if !self.index.contains_key(order_id) {
            tracing::debug!(order = %order_id, "Modify: order not found");
            return Err(LimitbookError::OrderNotFound(*order_id));
        }
        self.config.check_quantity(quantity, true)?;
        if let Some(price) = price {
            self.config.check_price(price)?;
        }

        let priority = self.issue_priority()?;
        let (side, price_before) = self
            .index
            .remove(order_id)
            .ok_or(LimitbookError::OrderNotFound(*order_id))?;
        let mut order = self
            .take(side, price_before, order_id)
            .ok_or(LimitbookError::OrderNotFound(*order_id))?;
        order.apply_modify(quantity, price, priority);

        if order.is_filled() {
            tracing::debug!(order = %order_id, "Order modified to zero quantity and removed");
            return Ok(order);
        }

        tracing::debug!(
            order = %order_id,
            price = %order.price(),
            qty = %quantity,
            priority = %priority,
            "Order modified"
        );
        let resting = order.clone();
        self.place(order);
        Ok(resting)
    }

    // =================================================================
    // Matching (engine only)
    // =================================================================

    /// Fill `taker` against the best opposite level if that level crosses.
    ///
    /// Fully filled makers leave the index and an exhausted level leaves
    /// its side, so the book invariants hold when this returns. Returns
    /// `None` when the opposite side is empty or its best price does not
    /// cross.
    pub(crate) fn match_best_level(
        &mut self,
        taker: &mut Order,
    ) -> Option<(Decimal, Vec<Execution>)> {
        let contra = taker.side().opposite();
        let (price, executions, exhausted) = {
            let level = match contra {
                OrderSide::Buy => self.bids.values_mut().next(),
                OrderSide::Sell => self.asks.values_mut().next(),
            }?;
            if !taker.crosses(level.price) {
                return None;
            }
            let executions = level.match_incoming(taker);
            (level.price, executions, level.is_empty())
        };

        for exec in executions.iter().filter(|e| e.maker_filled) {
            self.index.remove(&exec.maker_order_id);
        }
        if exhausted {
            match contra {
                OrderSide::Buy => self.bids.remove(&Reverse(price)),
                OrderSide::Sell => self.asks.remove(&price),
            };
        }
        Some((price, executions))
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Priority-ordered snapshot of one side: best price first, then
    /// oldest first within a price.
    #[must_use]
    pub fn get_orders(&self, side: OrderSide) -> Vec<Order> {
        self.levels(side).flat_map(PriceLevel::iter).cloned().collect()
    }

    /// Look up a resting order by ID.
    #[must_use]
    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        let (side, price) = self.index.get(order_id)?;
        let level = match side {
            OrderSide::Buy => self.bids.get(&Reverse(*price)),
            OrderSide::Sell => self.asks.get(price),
        }?;
        level.get(order_id)
    }

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Spread = best_ask - best_bid. `None` if either side is empty.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Mid price = (best_bid + best_ask) / 2. `None` if either side is empty.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Aggregated `(price, total remaining)` for up to `limit` levels,
    /// best first.
    #[must_use]
    pub fn depth(&self, side: OrderSide, limit: usize) -> Vec<(Decimal, Decimal)> {
        self.levels(side)
            .take(limit)
            .map(|level| (level.price, level.total_quantity()))
            .collect()
    }

    /// Total number of orders currently in the book.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Number of distinct bid price levels.
    #[must_use]
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[must_use]
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    /// Returns `true` if the book has no orders on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check if an order is resting in the book.
    #[must_use]
    pub fn contains_order(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    // =================================================================
    // Iteration
    // =================================================================

    /// Iterate one side's levels from best to worst.
    pub fn levels(&self, side: OrderSide) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match side {
            OrderSide::Buy => Box::new(self.bid_levels()),
            OrderSide::Sell => Box::new(self.ask_levels()),
        }
    }

    /// Iterate bid levels from best (highest) to worst.
    pub fn bid_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.bids.values()
    }

    /// Iterate ask levels from best (lowest) to worst.
    pub fn ask_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.asks.values()
    }

    // =================================================================
    // Maintenance
    // =================================================================

    /// Drain all orders from the book: bids best first, then asks best
    /// first. The sequencer keeps counting.
    pub fn drain_all(&mut self) -> Vec<Order> {
        self.index.clear();
        let mut all = Vec::new();
        for level in self.bids.values_mut() {
            all.extend(level.drain());
        }
        for level in self.asks.values_mut() {
            all.extend(level.drain());
        }
        self.bids.clear();
        self.asks.clear();
        tracing::info!(market = %self.config.market, drained = all.len(), "Order book drained");
        all
    }
}

/// An order may enter the book or the matcher only with a positive price,
/// a positive remaining quantity and a priority below `u64::MAX`.
pub(crate) fn check_open(order: &Order) -> Result<()> {
    if order.priority().checked_next().is_none() {
        return Err(LimitbookError::invalid("priority sequence exhausted"));
    }
    if order.remaining_qty() <= Decimal::ZERO {
        return Err(LimitbookError::invalid(
            "remaining quantity must be positive",
        ));
    }
    if order.price() <= Decimal::ZERO {
        return Err(LimitbookError::invalid("price must be positive"));
    }
    Ok(())
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.config.market)?;
        writeln!(f, "BIDS")?;
        render_side(f, self.bid_levels())?;
        writeln!(f, "ASKS")?;
        render_side(f, self.ask_levels())
    }
}

fn render_side<'a>(
    f: &mut fmt::Formatter<'_>,
    levels: impl Iterator<Item = &'a PriceLevel>,
) -> fmt::Result {
    let mut empty = true;
    for level in levels {
        empty = false;
        writeln!(f, "  {} (total {})", level.price, level.total_quantity())?;
        for order in level.iter() {
            writeln!(
                f,
                "    {} {} qty={}",
                order.priority(),
                order.id(),
                order.remaining_qty()
            )?;
        }
    }
    if empty {
        writeln!(f, "  (empty)")?;
    }
    Ok(())
}
