//! Unit families and purchase/sale unit resolution.
//!
//! - `types` - Unit families and the registry
//! - `resolver` - Valid purchase units, sale units, and canonical conversion
//! - `error` - Unit resolution errors

pub mod error;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod resolver_props;

pub use error::UnitError;
pub use resolver::{FamilyResolution, UnitConversionResolver};
pub use types::{PIECE_FAMILY, UnitFamily, UnitFamilyRecord, UnitRegistry};
