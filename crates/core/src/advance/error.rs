//! Advance credit error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when applying supplier advance credit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvanceError {
    /// Requested amount is more than may be applied.
    #[error("Advance request {requested} exceeds applicable credit {available}")]
    AdvanceExceeded {
        /// Amount requested.
        requested: Decimal,
        /// Maximum applicable amount.
        available: Decimal,
    },

    /// Requested amount is negative.
    #[error("Advance amount cannot be negative")]
    NegativeAmount,
}

impl AdvanceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AdvanceExceeded { .. } => "ADVANCE_EXCEEDED",
            Self::NegativeAmount => "NEGATIVE_ADVANCE_AMOUNT",
        }
    }
}
