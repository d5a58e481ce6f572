//! Error types for limitbook.
//!
//! All errors use the `LB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::OrderId;

/// Central error enum for all limitbook operations.
#[derive(Debug, Error)]
pub enum LimitbookError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The requested order is not resting in the book.
    #[error("LB_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order failed validation (non-positive price, bad quantity, off-tick).
    #[error("LB_ERR_101: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// An order with this ID is already resting.
    #[error("LB_ERR_102: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (unparsable or out-of-range book config).
    #[error("LB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl LimitbookError {
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }

    /// `true` for the recoverable "no such order" signal.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::OrderNotFound(_))
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LimitbookError>;

impl From<serde_json::Error> for LimitbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
