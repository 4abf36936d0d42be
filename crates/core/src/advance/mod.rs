//! Supplier advance credit.

pub mod error;
pub mod ledger;

pub use error::AdvanceError;
pub use ledger::{AdvanceApplication, AdvanceCreditLedger, SupplierAccount, SupplierBalanceDelta};
