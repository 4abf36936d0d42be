//! Payment error types.

use thiserror::Error;

/// Errors raised by payment operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Installment count and duration must both be at least 1.
    #[error("Installment plan needs count >= 1 and duration >= 1 month (got {count}, {duration_months})")]
    InvalidInstallmentPlan {
        /// Requested installment count.
        count: u32,
        /// Requested duration in months.
        duration_months: u32,
    },

    /// Unrecognised payment status string.
    #[error("Unknown payment status: {0}")]
    UnknownStatus(String),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInstallmentPlan { .. } => "INVALID_INSTALLMENT_PLAN",
            Self::UnknownStatus(_) => "UNKNOWN_PAYMENT_STATUS",
        }
    }
}
