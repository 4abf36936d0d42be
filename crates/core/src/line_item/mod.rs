//! Purchase line items.
//!
//! - `types` - Line items, catalog records, variant identity
//! - `calculator` - Extended cost, merging, editing, and document totals
//! - `error` - Line item errors

pub mod calculator;
pub mod error;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::LineItemCalculator;
pub use error::LineItemError;
pub use types::{CatalogItem, LineItem, LineItemField, LineItemUpdate, VariantKey};
