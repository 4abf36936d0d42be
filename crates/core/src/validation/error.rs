//! Validation error types.

use std::fmt;

use procura_shared::AppError;
use procura_shared::types::PaymentAccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::line_item::LineItemField;

/// Directory reference a purchase must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceField {
    /// The supplier goods are bought from.
    Supplier,
    /// The warehouse stock is posted to.
    Warehouse,
}

impl ReferenceField {
    /// Returns the draft field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supplier => "supplier_id",
            Self::Warehouse => "warehouse_id",
        }
    }
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user-correctable problem found before commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The purchase has no line items.
    #[error("Purchase has no line items")]
    EmptyTransaction,

    /// Supplier or warehouse not chosen.
    #[error("Missing reference: {field}")]
    MissingReference {
        /// Which reference is missing.
        field: ReferenceField,
    },

    /// A line item field holds an invalid value.
    #[error("Line item {index} has an invalid {field}")]
    InvalidLineItem {
        /// Position of the line.
        index: usize,
        /// Offending field.
        field: LineItemField,
    },

    /// Shipment-level transportation cost is negative.
    #[error("Transportation cost cannot be negative")]
    InvalidTransportationCost,

    /// Paid amount is negative or above the grand total.
    #[error("Paid amount {paid_amount} must be between 0 and the grand total {grand_total}")]
    InvalidPaidAmount {
        /// Paid amount.
        paid_amount: Decimal,
        /// Grand total.
        grand_total: Decimal,
    },

    /// Cash is being paid but no account was chosen.
    #[error("A payment account is required when an amount is paid")]
    MissingPaymentAccount,

    /// The chosen account is not in the account directory.
    #[error("Unknown payment account: {0}")]
    UnknownPaymentAccount(PaymentAccountId),

    /// The chosen account cannot cover the cash portion.
    #[error("Account {account_id} has {available} available, {required} required")]
    InsufficientAccountBalance {
        /// The account.
        account_id: PaymentAccountId,
        /// Current balance.
        available: Decimal,
        /// Cash to be drawn.
        required: Decimal,
    },

    /// Installment status without a plan of at least one installment over one month.
    #[error("Installment plan requires at least one installment over at least one month")]
    InvalidInstallmentPlan,

    /// More advance credit requested than may be applied.
    #[error("Advance of {requested} requested, only {available} may be applied")]
    AdvanceExceeded {
        /// Amount requested.
        requested: Decimal,
        /// `min(max(0, advance_balance), grand_total)`.
        available: Decimal,
    },
}

impl ValidationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTransaction => "EMPTY_TRANSACTION",
            Self::MissingReference { .. } => "MISSING_REFERENCE",
            Self::InvalidLineItem { .. } => "INVALID_LINE_ITEM",
            Self::InvalidTransportationCost => "INVALID_TRANSPORTATION_COST",
            Self::InvalidPaidAmount { .. } => "INVALID_PAID_AMOUNT",
            Self::MissingPaymentAccount => "MISSING_PAYMENT_ACCOUNT",
            Self::UnknownPaymentAccount(_) => "UNKNOWN_PAYMENT_ACCOUNT",
            Self::InsufficientAccountBalance { .. } => "INSUFFICIENT_ACCOUNT_BALANCE",
            Self::InvalidInstallmentPlan => "INVALID_INSTALLMENT_PLAN",
            Self::AdvanceExceeded { .. } => "ADVANCE_EXCEEDED",
        }
    }

    /// Path of the draft field the error is tagged with.
    #[must_use]
    pub fn field_path(&self) -> String {
        match self {
            Self::EmptyTransaction => "line_items".to_string(),
            Self::MissingReference { field } => field.as_str().to_string(),
            Self::InvalidLineItem { index, field } => format!("line_items[{index}].{field}"),
            Self::InvalidTransportationCost => "transportation_cost".to_string(),
            Self::InvalidPaidAmount { .. } => "paid_amount".to_string(),
            Self::MissingPaymentAccount
            | Self::UnknownPaymentAccount(_)
            | Self::InsufficientAccountBalance { .. } => "payment_account_id".to_string(),
            Self::InvalidInstallmentPlan => "installment_plan".to_string(),
            Self::AdvanceExceeded { .. } => "advance_applied".to_string(),
        }
    }
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Purchase failed validation with {} error(s)", .0.len())]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Wraps a non-empty list of errors.
    #[must_use]
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    /// The collected errors, in check order.
    #[must_use]
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// Returns true if an error with the given code was collected.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.0.iter().any(|err| err.error_code() == code)
    }

    /// Number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Unwraps the list.
    #[must_use]
    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let detail = errors
            .iter()
            .map(|err| format!("{}: {err}", err.field_path()))
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(detail)
    }
}
