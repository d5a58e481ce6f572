//! Deterministic fingerprints of book state and fill streams.
//!
//! Two books with the same resting orders in the same priority order hash
//! to the same digest, whatever sequence of operations produced them.
//! Replaying the same order flow into fresh engines must produce the same
//! fill root.

use limitbook_types::Fill;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::{OrderBook, PriceLevel};

fn hash_decimal(hasher: &mut Sha256, value: Decimal) {
    // 99.9 and 99.90 are the same price
    hasher.update(value.normalize().to_string().as_bytes());
    hasher.update(b";");
}

fn hash_side<'a>(hasher: &mut Sha256, tag: &[u8], levels: impl Iterator<Item = &'a PriceLevel>) {
    hasher.update(tag);
    for level in levels {
        hash_decimal(hasher, level.price);
        hasher.update((level.len() as u64).to_le_bytes());
        for order in level.iter() {
            hasher.update(order.id().0.as_bytes());
            hash_decimal(hasher, order.remaining_qty());
            hasher.update(order.priority().0.to_le_bytes());
        }
    }
}

/// Hash every resting order, bids then asks, best price first and oldest
/// first within a level.
#[must_use]
pub fn compute_book_digest(book: &OrderBook) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"limitbook:book:v1:");
    hash_side(&mut hasher, b"bids:", book.bid_levels());
    hash_side(&mut hasher, b"asks:", book.ask_levels());

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Hash a fill stream in order.
///
/// Covers IDs, counterparties, price and quantity; `executed_at` is
/// excluded so replays at different times agree.
#[must_use]
pub fn compute_fill_root(fills: &[Fill]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"limitbook:fills:v1:");
    hasher.update((fills.len() as u64).to_le_bytes());

    for fill in fills {
        hasher.update(fill.id.0.as_bytes());
        hasher.update(fill.taker_order_id.0.as_bytes());
        hasher.update(fill.maker_order_id.0.as_bytes());
        hash_decimal(&mut hasher, fill.price);
        hash_decimal(&mut hasher, fill.quantity);
    }

    let mut root = [0u8; 32];
    root.copy_from_slice(&hasher.finalize());
    root
}

/// Recompute the fill root and compare with `expected_root`.
#[must_use]
pub fn verify_fill_root(fills: &[Fill], expected_root: &[u8; 32]) -> bool {
    compute_fill_root(fills) == *expected_root
}

/// Lowercase hex rendering of a digest, for logs.
#[must_use]
pub fn digest_hex(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}
