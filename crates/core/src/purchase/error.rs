//! Purchase reducer and snapshot errors.

use procura_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::line_item::LineItemError;
use crate::payment::PaymentStatus;
use crate::validation::ValidationErrors;

/// Why an edit event was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A line item edit failed.
    #[error(transparent)]
    LineItem(#[from] LineItemError),

    /// A purchase-level amount is outside the accepted amount range.
    #[error("Amount {0} is out of range")]
    AmountOutOfRange(Decimal),
}

impl EditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LineItem(err) => err.error_code(),
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
        }
    }
}

/// An edit event could not be applied to the draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot apply {event}: {source}")]
pub struct ReconcileError {
    /// Kind of the rejected event.
    pub event: &'static str,
    /// Underlying failure.
    #[source]
    pub source: EditError,
}

impl ReconcileError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        self.source.error_code()
    }
}

/// A purchase snapshot breaks an invariant the validator guarantees.
///
/// Seeing one of these means a snapshot was built or altered outside
/// validation; it is a caller bug, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// No line items.
    #[error("snapshot has no line items")]
    NoLineItems,

    /// A line total differs from `round(quantity * unit_price, 2)`.
    #[error("line {index} total does not match quantity times unit price")]
    LineTotalMismatch {
        /// Position of the line.
        index: usize,
    },

    /// A line holds a non-positive price or quantity, or a negative surcharge.
    #[error("line {index} has a non-positive amount")]
    InvalidLineAmount {
        /// Position of the line.
        index: usize,
    },

    /// Stored grand total differs from the recomputed one.
    #[error("grand total {stored} does not match computed {computed}")]
    GrandTotalMismatch {
        /// Stored value.
        stored: Decimal,
        /// Recomputed value.
        computed: Decimal,
    },

    /// Paid amount outside `[0, grand_total]`.
    #[error("paid amount {paid_amount} outside 0..={grand_total}")]
    PaidOutOfRange {
        /// Paid amount.
        paid_amount: Decimal,
        /// Grand total.
        grand_total: Decimal,
    },

    /// Due amount differs from `max(0, grand_total - paid_amount)`.
    #[error("due amount does not match grand total minus paid amount")]
    DueMismatch,

    /// Status disagrees with the paid amount.
    #[error("status {status} is inconsistent with paid amount {paid_amount}")]
    StatusMismatch {
        /// Status on the snapshot.
        status: PaymentStatus,
        /// Paid amount on the snapshot.
        paid_amount: Decimal,
    },

    /// Advance and cash portions do not add up to the paid amount.
    #[error("advance {advance_applied} and cash {cash_paid} do not make up the paid amount")]
    PortionMismatch {
        /// Advance portion.
        advance_applied: Decimal,
        /// Cash portion.
        cash_paid: Decimal,
    },

    /// Shipment transportation cost is negative or out of range.
    #[error("transportation cost {0} is invalid")]
    InvalidTransportationCost(Decimal),

    /// Something is paid without an account, or an unpaid purchase names one.
    #[error("payment account presence is inconsistent with the paid amount")]
    AccountMismatch,

    /// Installment schedule missing, malformed, or not summing to the total.
    #[error("installment schedule is inconsistent with the plan or totals")]
    ScheduleMismatch,

    /// A line names a unit its family does not have.
    #[error("line {index} uses a unit outside its family")]
    UnknownUnit {
        /// Position of the line.
        index: usize,
    },

    /// A line's sale unit is larger than its purchase unit.
    #[error("line {index} sells in a unit larger than it was purchased in")]
    SaleUnitTooLarge {
        /// Position of the line.
        index: usize,
    },

    /// A stock posting's canonical quantity is not the purchase quantity converted.
    #[error("stock posting {index} canonical quantity does not match the purchase quantity")]
    CanonicalQuantityMismatch {
        /// Position of the line.
        index: usize,
    },

    /// Stock postings do not line up with the line items.
    #[error("stock postings do not match line items")]
    StockMismatch,
}

/// Failure of the combined replay-and-validate operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// An edit event was rejected.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// The resulting draft failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

impl PurchaseError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Reconcile(err) => err.error_code(),
            Self::Invalid(_) => "VALIDATION_FAILED",
        }
    }
}

impl From<PurchaseError> for AppError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::Reconcile(err) => Self::Validation(err.to_string()),
            PurchaseError::Invalid(errors) => errors.into(),
        }
    }
}
