//! Shared helpers for limitbook-core integration tests.

#![allow(dead_code)]

use std::sync::Once;

use limitbook_core::{MatchOutcome, MatchingEngine, OrderBook};
use limitbook_types::*;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// `RUST_LOG` overrides the default `limitbook_core=debug` filter.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("limitbook_core=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn px(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

pub fn qty(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// Build through the engine's sequencer and rest without matching.
pub fn rest(engine: &mut MatchingEngine, side: OrderSide, price: Decimal, q: i64) -> OrderId {
    let order = engine.new_order(side, price, qty(q)).unwrap();
    let id = order.id();
    engine.book_mut().add(order).unwrap();
    id
}

pub fn submit(engine: &mut MatchingEngine, side: OrderSide, price: Decimal, q: i64) -> MatchOutcome {
    let order = engine.new_order(side, price, qty(q)).unwrap();
    engine.process_order(order).unwrap()
}

/// Check every structural invariant of the book.
pub fn assert_book_invariants(book: &OrderBook) {
    for side in [OrderSide::Buy, OrderSide::Sell] {
        let orders = book.get_orders(side);

        for pair in orders.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            match side {
                OrderSide::Buy => assert!(a.price() >= b.price(), "bids out of price order"),
                OrderSide::Sell => assert!(a.price() <= b.price(), "asks out of price order"),
            }
            if a.price() == b.price() {
                assert!(
                    a.priority() <= b.priority(),
                    "time priority broken at {}",
                    a.price()
                );
            }
        }

        for order in &orders {
            assert_eq!(order.side(), side);
            assert!(order.remaining_qty() > Decimal::ZERO, "filled order left resting");
            assert_eq!(book.get(&order.id()), Some(order));
        }

        for level in book.levels(side) {
            assert!(!level.is_empty(), "empty level at {}", level.price);
            assert!(level.iter().all(|o| o.price() == level.price));
        }
    }

    let total = book.get_orders(OrderSide::Buy).len() + book.get_orders(OrderSide::Sell).len();
    assert_eq!(book.order_count(), total);
}
