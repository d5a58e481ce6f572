//! # limitbook-types
//!
//! Shared types, errors, and configuration for the **limitbook** order book.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`Priority`], [`FillId`], [`MarketPair`]
//! - **Order model**: [`Order`], [`OrderSide`]
//! - **Fill model**: [`Fill`]
//! - **Configuration**: [`BookConfig`]
//! - **Errors**: [`LimitbookError`] with `LB_ERR_` prefix codes
//! - **Constants**: precisions and engine identification

pub mod config;
pub mod constants;
pub mod error;
pub mod fill;
pub mod ids;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use limitbook_types::{Order, OrderSide, Fill, ...};

pub use config::*;
pub use error::*;
pub use fill::*;
pub use ids::*;
pub use order::*;

// Constants are accessed via `limitbook_types::constants::FOO`
// (not re-exported to avoid name collisions).
