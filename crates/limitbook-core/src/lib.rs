//! # limitbook-core
//!
//! **Limit-order book with price-time priority and a continuous matching
//! engine.**
//!
//! - **Price priority**: better price always fills first
//! - **Time priority**: within a price, the oldest [`Priority`] fills first
//! - **Fills keep queue position**; a manual modify gives it up
//! - **Single-threaded**: every mutation is `&mut self` and runs to completion
//!
//! [`Priority`]: limitbook_types::Priority

pub mod digest;
pub mod engine;
pub mod orderbook;
pub mod price_level;

pub use digest::{compute_book_digest, compute_fill_root, digest_hex, verify_fill_root};
pub use engine::{MatchOutcome, MatchingEngine};
pub use orderbook::OrderBook;
pub use price_level::PriceLevel;
