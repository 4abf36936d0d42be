//! Payment reconciliation.
//!
//! # Modules
//!
//! - `types` - Payment status, driver, state, and snapshot
//! - `reconciler` - Status transitions and paid amount derivation
//! - `schedule` - Installment schedule generation
//! - `error` - Payment errors

pub mod error;
pub mod reconciler;
pub mod schedule;
pub mod types;

#[cfg(test)]
mod reconciler_props;

pub use error::PaymentError;
pub use reconciler::PaymentReconciler;
pub use schedule::InstallmentSchedule;
pub use types::{
    Installment, InstallmentPlan, PaymentDriver, PaymentSnapshot, PaymentState, PaymentStatus,
};
