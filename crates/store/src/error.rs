//! Commit error types.

use procura_core::purchase::InvariantViolation;
use procura_shared::AppError;
use procura_shared::types::{PaymentAccountId, PurchaseId, SupplierId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while committing a purchase.
///
/// Apart from `Storage`, every failure leaves stored state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The snapshot breaks an invariant validation guarantees.
    #[error("Refusing to commit: {0}")]
    ContractViolation(#[from] InvariantViolation),

    /// A different purchase was already committed under this identifier.
    #[error("Purchase {0} was already committed with different contents")]
    DuplicateId(PurchaseId),

    /// The supplier's advance balance changed since the snapshot was built.
    #[error("Advance of {requested} requested, only {available} available")]
    AdvanceExceeded {
        /// Advance applied by the snapshot.
        requested: Decimal,
        /// Current usable advance balance.
        available: Decimal,
    },

    /// The payment account cannot cover the cash debit.
    #[error("Account {account_id} has {available} available, {required} required")]
    InsufficientAccountBalance {
        /// The account.
        account_id: PaymentAccountId,
        /// Current balance.
        available: Decimal,
        /// Cash to be drawn.
        required: Decimal,
    },

    /// Supplier not in the store.
    #[error("Unknown supplier: {0}")]
    UnknownSupplier(SupplierId),

    /// Payment account not in the store.
    #[error("Unknown payment account: {0}")]
    UnknownAccount(PaymentAccountId),

    /// Storage failed before anything was applied.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CommitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ContractViolation(_) => "CONTRACT_VIOLATION",
            Self::DuplicateId(_) => "DUPLICATE_PURCHASE_ID",
            Self::AdvanceExceeded { .. } => "ADVANCE_EXCEEDED",
            Self::InsufficientAccountBalance { .. } => "INSUFFICIENT_ACCOUNT_BALANCE",
            Self::UnknownSupplier(_) => "UNKNOWN_SUPPLIER",
            Self::UnknownAccount(_) => "UNKNOWN_PAYMENT_ACCOUNT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if committing the same snapshot again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<CommitError> for AppError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::ContractViolation(_) => Self::ContractViolation(err.to_string()),
            CommitError::AdvanceExceeded { .. } => Self::Conflict(err.to_string()),
            CommitError::DuplicateId(_) | CommitError::InsufficientAccountBalance { .. } => {
                Self::BusinessRule(err.to_string())
            }
            CommitError::UnknownSupplier(_) | CommitError::UnknownAccount(_) => {
                Self::NotFound(err.to_string())
            }
            CommitError::Storage(msg) => Self::Storage(msg),
        }
    }
}
