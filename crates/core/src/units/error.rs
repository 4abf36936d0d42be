//! Unit conversion error types.

use thiserror::Error;

/// Errors raised while resolving unit families and units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The unit family is not registered.
    #[error("Unknown unit family: {0}")]
    UnknownUnitFamily(String),

    /// The unit does not belong to the family.
    #[error("Unit {unit} is not part of the {family} family")]
    UnknownUnit {
        /// Family that was searched.
        family: String,
        /// Unit that was requested.
        unit: String,
    },

    /// A conversion factor is zero or negative.
    #[error("Unit {unit} in family {family} must have a strictly positive factor")]
    InvalidFactor {
        /// Family being defined.
        family: String,
        /// Offending unit.
        unit: String,
    },

    /// The family has no unit with factor 1.
    #[error("Unit family {0} has no canonical unit with factor 1")]
    MissingCanonicalUnit(String),

    /// The sale unit is larger than the purchase unit.
    #[error("Sale unit {sale_unit} is larger than purchase unit {purchase_unit}")]
    SaleUnitTooLarge {
        /// Requested sale unit.
        sale_unit: String,
        /// Purchase unit it was compared against.
        purchase_unit: String,
    },

    /// Converting to the canonical unit leaves the representable range.
    #[error("Quantity in {unit} of family {family} is too large to convert")]
    ConversionOverflow {
        /// Family of the unit.
        family: String,
        /// Unit converted from.
        unit: String,
    },
}

impl UnitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownUnitFamily(_) => "UNKNOWN_UNIT_FAMILY",
            Self::UnknownUnit { .. } => "UNKNOWN_UNIT",
            Self::InvalidFactor { .. } => "INVALID_UNIT_FACTOR",
            Self::MissingCanonicalUnit(_) => "MISSING_CANONICAL_UNIT",
            Self::SaleUnitTooLarge { .. } => "SALE_UNIT_TOO_LARGE",
            Self::ConversionOverflow { .. } => "CONVERSION_OVERFLOW",
        }
    }
}
