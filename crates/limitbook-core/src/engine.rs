//! Continuous price-time matching.
//!
//! ```text
//! process_order(Order) -> MatchOutcome
//! ```
//!
//! The incoming (taker) order walks the opposite side best price first
//! and, inside each level, oldest order first. The walk stops at the
//! first level whose price the taker's limit does not cross, or when the
//! taker is filled. Any remainder rests on the taker's own side at its
//! original price and original priority.

use chrono::Utc;
use limitbook_types::{Fill, FillId, LimitbookError, Order, OrderId, OrderSide, Result};
use rust_decimal::Decimal;

use crate::OrderBook;
use crate::orderbook::check_open;

/// What one [`MatchingEngine::process_order`] call did.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub order_id: OrderId,
    pub side: OrderSide,
    /// Open quantity when the order arrived.
    pub initial_qty: Decimal,
    /// Executions in the order they happened.
    pub fills: Vec<Fill>,
    /// Copy of the remainder now resting in the book, if any.
    pub resting: Option<Order>,
}

impl MatchOutcome {
    /// Sum of all fill quantities.
    #[must_use]
    pub fn filled_qty(&self) -> Decimal {
        self.fills.iter().map(|f| f.quantity).sum()
    }

    #[must_use]
    pub fn remaining_qty(&self) -> Decimal {
        self.resting
            .as_ref()
            .map_or(Decimal::ZERO, Order::remaining_qty)
    }

    #[must_use]
    pub fn is_fully_filled(&self) -> bool {
        self.resting.is_none()
    }
}

/// Matching engine over a single [`OrderBook`].
///
/// The engine owns the book. All access is `&mut self`; a caller that
/// needs to share it across threads wraps the whole engine in one lock.
#[derive(Debug, Default)]
pub struct MatchingEngine {
    book: OrderBook,
}

impl MatchingEngine {
    #[must_use]
    pub fn new(book: OrderBook) -> Self {
        Self { book }
    }

    #[must_use]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Direct book access for add / delete / modify.
    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    #[must_use]
    pub fn into_book(self) -> OrderBook {
        self.book
    }

    /// Build an order from the book's sequencer. See [`OrderBook::new_order`].
    pub fn new_order(&mut self, side: OrderSide, price: Decimal, quantity: Decimal) -> Result<Order> {
        self.book.new_order(side, price, quantity)
    }

    /// Cross `order` against resting liquidity, then rest any remainder.
    ///
    /// ## Algorithm
    ///
    /// 1. Take the best level on the opposite side
    /// 2. Stop if the taker's limit does not cross it (worse levels cannot either)
    /// 3. Fill oldest-first at that level's price; fills never reset priority
    /// 4. Drop fully filled makers and the level once it is empty
    /// 5. Repeat until the taker is filled or nothing crosses
    /// 6. Rest the remainder via [`OrderBook::add`]
    ///
    /// Rejected up front, with the book untouched: an order whose ID is
    /// already resting and an order without a positive price and
    /// remaining quantity.
    pub fn process_order(&mut self, order: Order) -> Result<MatchOutcome> {
        if self.book.contains_order(&order.id()) {
            return Err(LimitbookError::DuplicateOrder(order.id()));
        }
        check_open(&order)?;

        let (order_id, side) = (order.id(), order.side());
        let mut taker = order;
        let initial_qty = taker.remaining_qty();
        let mut fills = Vec::new();
        let mut fill_seq: u64 = 0;

        while !taker.is_filled() {
            let Some((price, executions)) = self.book.match_best_level(&mut taker) else {
                break;
            };

            for exec in executions {
                let fill = Fill {
                    id: FillId::deterministic(order_id, taker.priority(), fill_seq),
                    taker_order_id: order_id,
                    maker_order_id: exec.maker_order_id,
                    taker_side: side,
                    price,
                    quantity: exec.quantity,
                    maker_filled: exec.maker_filled,
                    executed_at: Utc::now(),
                };
                fill_seq += 1;

                tracing::debug!(
                    fill = %fill.id,
                    taker = %fill.taker_order_id,
                    maker = %fill.maker_order_id,
                    price = %fill.price,
                    qty = %fill.quantity,
                    maker_filled = fill.maker_filled,
                    "Order filled"
                );
                fills.push(fill);
            }
        }

        let resting = if taker.is_filled() {
            None
        } else {
            let remainder = taker.clone();
            self.book.add(taker)?;
            Some(remainder)
        };

        let outcome = MatchOutcome {
            order_id,
            side,
            initial_qty,
            fills,
            resting,
        };

        tracing::debug!(
            order = %outcome.order_id,
            side = %outcome.side,
            fills = outcome.fills.len(),
            filled = %outcome.filled_qty(),
            remaining = %outcome.remaining_qty(),
            "Order processed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use limitbook_types::*;
    use rust_decimal::Decimal;

    use super::*;

    fn px(mantissa: i64, scale: u32) -> Decimal {
        Decimal::new(mantissa, scale)
    }

    fn qty(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn rest(engine: &mut MatchingEngine, side: OrderSide, price: Decimal, q: i64) -> OrderId {
        let order = engine.new_order(side, price, qty(q)).unwrap();
        let id = order.id();
        engine.book_mut().add(order).unwrap();
        id
    }

    fn submit(engine: &mut MatchingEngine, side: OrderSide, price: Decimal, q: i64) -> MatchOutcome {
        let order = engine.new_order(side, price, qty(q)).unwrap();
        engine.process_order(order).unwrap()
    }

    #[test]
    fn sell_fills_best_bid_partially() {
        let mut engine = MatchingEngine::default();
        let best = rest(&mut engine, OrderSide::Buy, px(999, 1), 10);
        let other = rest(&mut engine, OrderSide::Buy, px(997, 1), 6);

        let outcome = submit(&mut engine, OrderSide::Sell, px(999, 1), 8);

        assert!(outcome.is_fully_filled());
        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].maker_order_id, best);
        assert_eq!(engine.book().get(&best).unwrap().remaining_qty(), qty(2));
        assert_eq!(engine.book().get(&other).unwrap().remaining_qty(), qty(6));
        assert!(engine.book().get_orders(OrderSide::Sell).is_empty());
    }

    #[test]
    fn buy_consumes_lowest_ask_first() {
        let mut engine = MatchingEngine::default();
        let far = rest(&mut engine, OrderSide::Sell, px(102, 0), 5);
        let near = rest(&mut engine, OrderSide::Sell, px(101, 0), 10);

        let outcome = submit(&mut engine, OrderSide::Buy, px(102, 0), 8);

        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].price, px(101, 0));
        let asks = engine.book().get_orders(OrderSide::Sell);
        assert_eq!(asks[0].id(), near);
        assert_eq!(asks[0].remaining_qty(), qty(2));
        assert_eq!(engine.book().get(&far).unwrap().remaining_qty(), qty(5));
    }

    #[test]
    fn sell_stops_at_first_non_crossing_bid() {
        let mut engine = MatchingEngine::default();
        let top = rest(&mut engine, OrderSide::Buy, px(100, 0), 10);
        let below = rest(&mut engine, OrderSide::Buy, px(998, 1), 20);

        let outcome = submit(&mut engine, OrderSide::Sell, px(100, 0), 25);

        assert_eq!(outcome.filled_qty(), qty(10));
        assert!(!engine.book().contains_order(&top));
        assert_eq!(engine.book().bid_depth(), 1);
        assert_eq!(engine.book().get(&below).unwrap().remaining_qty(), qty(20));

        let asks = engine.book().get_orders(OrderSide::Sell);
        assert_eq!(asks.len(), 1);
        assert_eq!(asks[0].remaining_qty(), qty(15));
        assert_eq!(asks[0].price(), px(100, 0));
    }

    #[test]
    fn unmatched_order_rests_in_full() {
        let mut engine = MatchingEngine::default();
        let outcome = submit(&mut engine, OrderSide::Buy, px(9995, 2), 15);

        assert!(outcome.fills.is_empty());
        let bids = engine.book().get_orders(OrderSide::Buy);
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].remaining_qty(), qty(15));
        assert_eq!(bids[0].price(), px(9995, 2));
    }

    #[test]
    fn sweep_multiple_levels_then_rest() {
        let mut engine = MatchingEngine::default();
        rest(&mut engine, OrderSide::Sell, px(101, 0), 3);
        rest(&mut engine, OrderSide::Sell, px(102, 0), 4);
        let untouched = rest(&mut engine, OrderSide::Sell, px(104, 0), 9);

        let outcome = submit(&mut engine, OrderSide::Buy, px(103, 0), 10);

        let prices: Vec<Decimal> = outcome.fills.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![px(101, 0), px(102, 0)]);
        assert!(outcome.fills.iter().all(|f| f.maker_filled));
        assert_eq!(outcome.remaining_qty(), qty(3));
        assert_eq!(engine.book().best_bid(), Some(px(103, 0)));
        assert_eq!(engine.book().best_ask(), Some(px(104, 0)));
        assert!(engine.book().contains_order(&untouched));
    }

    #[test]
    fn equal_price_crosses() {
        let mut engine = MatchingEngine::default();
        rest(&mut engine, OrderSide::Sell, px(100, 0), 1);
        let outcome = submit(&mut engine, OrderSide::Buy, px(100, 0), 1);
        assert!(outcome.is_fully_filled());
        assert!(engine.book().is_empty());
    }

    #[test]
    fn time_priority_within_level() {
        let mut engine = MatchingEngine::default();
        let first = rest(&mut engine, OrderSide::Buy, px(100, 0), 2);
        let second = rest(&mut engine, OrderSide::Buy, px(100, 0), 2);

        let outcome = submit(&mut engine, OrderSide::Sell, px(100, 0), 3);

        assert_eq!(outcome.fills[0].maker_order_id, first);
        assert_eq!(outcome.fills[1].maker_order_id, second);
        assert!(!engine.book().contains_order(&first));
        assert_eq!(engine.book().get(&second).unwrap().remaining_qty(), qty(1));
    }

    #[test]
    fn partial_fill_keeps_maker_priority() {
        let mut engine = MatchingEngine::default();
        let maker = rest(&mut engine, OrderSide::Sell, px(101, 0), 10);
        let before = engine.book().get(&maker).unwrap().priority();

        submit(&mut engine, OrderSide::Buy, px(101, 0), 4);

        let after = engine.book().get(&maker).unwrap();
        assert_eq!(after.priority(), before);
        assert_eq!(after.remaining_qty(), qty(6));
        assert_eq!(after.quantity(), qty(10));
    }

    #[test]
    fn resting_remainder_keeps_original_priority() {
        let mut engine = MatchingEngine::default();
        rest(&mut engine, OrderSide::Sell, px(101, 0), 2);
        let taker = engine.new_order(OrderSide::Buy, px(101, 0), qty(5)).unwrap();
        let priority = taker.priority();

        let outcome = engine.process_order(taker).unwrap();
        let resting = outcome.resting.unwrap();
        assert_eq!(resting.priority(), priority);
        assert_eq!(resting.remaining_qty(), qty(3));
        assert_eq!(resting.filled_qty(), qty(2));
    }

    #[test]
    fn duplicate_taker_rejected() {
        let mut engine = MatchingEngine::default();
        let order = engine.new_order(OrderSide::Buy, px(100, 0), qty(1)).unwrap();
        engine.book_mut().add(order.clone()).unwrap();

        let result = engine.process_order(order);
        assert!(matches!(result, Err(LimitbookError::DuplicateOrder(_))));
        assert_eq!(engine.book().order_count(), 1);
    }

    #[test]
    fn zero_quantity_taker_rejected() {
        let mut engine = MatchingEngine::default();
        rest(&mut engine, OrderSide::Sell, px(100, 0), 1);
        let mut order = engine.new_order(OrderSide::Buy, px(100, 0), qty(1)).unwrap();
        order.apply_fill(qty(1));

        assert!(engine.process_order(order).is_err());
        assert_eq!(engine.book().order_count(), 1);
    }

    #[test]
    fn negative_quantity_taker_rejected() {
        let mut engine = MatchingEngine::default();
        let maker = rest(&mut engine, OrderSide::Sell, px(100, 0), 10);
        let taker = Order::new(OrderSide::Buy, px(100, 0), qty(-5), Priority(50));

        assert!(matches!(
            engine.process_order(taker),
            Err(LimitbookError::InvalidOrder { .. })
        ));
        assert_eq!(engine.book().get(&maker).unwrap().remaining_qty(), qty(10));
        assert_eq!(engine.book().order_count(), 1);
    }

    #[test]
    fn taker_at_end_of_priority_sequence_rejected_before_matching() {
        let mut engine = MatchingEngine::default();
        let maker = rest(&mut engine, OrderSide::Sell, px(100, 0), 2);
        let taker = Order::new(OrderSide::Buy, px(100, 0), qty(5), Priority(u64::MAX));

        assert!(engine.process_order(taker).is_err());
        assert_eq!(engine.book().get(&maker).unwrap().remaining_qty(), qty(2));
    }

    #[test]
    fn takers_sharing_a_priority_get_distinct_fill_ids() {
        let mut engine = MatchingEngine::default();
        rest(&mut engine, OrderSide::Sell, px(100, 0), 2);
        let a = Order::new(OrderSide::Buy, px(100, 0), qty(1), Priority(50));
        let b = Order::new(OrderSide::Buy, px(100, 0), qty(1), Priority(50));

        let fa = engine.process_order(a).unwrap().fills;
        let fb = engine.process_order(b).unwrap().fills;
        assert_ne!(fa[0].id, fb[0].id);
    }

    #[test]
    fn fills_report_taker_side_and_ids() {
        let mut engine = MatchingEngine::default();
        rest(&mut engine, OrderSide::Buy, px(100, 0), 5);
        let taker = engine.new_order(OrderSide::Sell, px(99, 0), qty(5)).unwrap();
        let taker_id = taker.id();

        let outcome = engine.process_order(taker).unwrap();
        let fill = &outcome.fills[0];
        assert_eq!(fill.taker_order_id, taker_id);
        assert_eq!(fill.taker_side, OrderSide::Sell);
        assert!(!fill.taker_is_buyer());
        assert_eq!(fill.price, px(100, 0), "executes at the resting price");
        assert_eq!(outcome.order_id, taker_id);
        assert_eq!(outcome.initial_qty, qty(5));
    }

    #[test]
    fn into_book_returns_state() {
        let mut engine = MatchingEngine::new(OrderBook::new());
        rest(&mut engine, OrderSide::Buy, px(100, 0), 5);
        let book = engine.into_book();
        assert_eq!(book.order_count(), 1);
    }
}
