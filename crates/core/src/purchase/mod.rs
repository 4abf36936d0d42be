//! Purchase drafts, edit events, and commit-ready snapshots.
//!
//! # Modules
//!
//! - `draft` - The editable draft and its reducer
//! - `event` - Edit events
//! - `context` - Reference data a draft is reconciled against
//! - `transaction` - Validated snapshot and commit plan
//! - `service` - Replay-and-validate entry point
//! - `error` - Reducer and invariant errors

pub mod context;
pub mod draft;
pub mod error;
pub mod event;
pub mod service;
pub mod transaction;

#[cfg(test)]
mod draft_props;

pub use context::EngineContext;
pub use draft::PurchaseDraft;
pub use error::{EditError, InvariantViolation, PurchaseError, ReconcileError};
pub use event::PurchaseEvent;
pub use service::PurchaseService;
pub use transaction::{AccountDebit, CommitPlan, PurchaseTransaction, StockIncrement};
