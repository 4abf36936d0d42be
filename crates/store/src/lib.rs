//! Persistence collaborator for committed purchases.
//!
//! A commit applies every side effect of a validated purchase as one unit:
//! stock postings, the cash debit, and the supplier balance changes.
//!
//! # Modules
//!
//! - `store` - The `PurchaseStore` contract and receipts
//! - `memory` - In-memory reference implementation
//! - `error` - Commit errors

pub mod error;
pub mod memory;
pub mod store;

pub use error::CommitError;
pub use memory::InMemoryPurchaseStore;
pub use store::{PurchaseStore, Receipt, commit_with_retry};
