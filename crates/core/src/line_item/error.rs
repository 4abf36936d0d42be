//! Line item error types.

use thiserror::Error;

use super::types::LineItemField;
use crate::units::UnitError;

/// Errors raised while editing line items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineItemError {
    /// No line exists at the given index.
    #[error("Line item index {index} is out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of lines.
        len: usize,
    },

    /// A value, or the line total it implies, is outside the accepted amount range.
    #[error("Line item {index} {field} is out of range")]
    AmountOutOfRange {
        /// Position of the line.
        index: usize,
        /// Field holding the value.
        field: LineItemField,
    },

    /// Unit resolution failed.
    #[error(transparent)]
    Unit(#[from] UnitError),
}

impl LineItemError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange { .. } => "LINE_ITEM_INDEX_OUT_OF_RANGE",
            Self::AmountOutOfRange { .. } => "LINE_ITEM_AMOUNT_OUT_OF_RANGE",
            Self::Unit(err) => err.error_code(),
        }
    }
}
