//! The commit contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procura_core::purchase::{CommitPlan, PurchaseTransaction};
use procura_shared::types::PurchaseId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CommitError;

/// Proof that a purchase was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Committed purchase.
    pub purchase_id: PurchaseId,
    /// When the commit was applied.
    pub committed_at: DateTime<Utc>,
    /// Grand total.
    pub grand_total: Decimal,
    /// Paid amount, advance included.
    pub paid_amount: Decimal,
    /// Amount still owed to the supplier.
    pub due_amount: Decimal,
    /// Advance credit consumed.
    pub advance_applied: Decimal,
    /// Side effects that were applied.
    pub plan: CommitPlan,
    /// True when this receipt answers a repeated commit of the same purchase.
    pub replayed: bool,
}

/// Persists validated purchases.
///
/// Implementations must apply a commit's [`CommitPlan`] all-or-nothing,
/// serialise advance debits per supplier, re-check the advance against the
/// current balance, and treat repeated commits of the same purchase as
/// no-ops that return the original receipt.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Commits a validated purchase.
    async fn commit(&self, transaction: &PurchaseTransaction) -> Result<Receipt, CommitError>;

    /// Receipt of an earlier commit.
    async fn receipt(&self, id: PurchaseId) -> Option<Receipt>;
}

/// Commits, retrying retryable failures up to `max_attempts` times in total.
///
/// Safe because commits are idempotent per purchase identifier.
///
/// # Errors
///
/// Returns the last error once attempts run out, or the first
/// non-retryable error.
pub async fn commit_with_retry<S>(
    store: &S,
    transaction: &PurchaseTransaction,
    max_attempts: u32,
) -> Result<Receipt, CommitError>
where
    S: PurchaseStore + ?Sized,
{
    let mut attempt = 1;
    loop {
        match store.commit(transaction).await {
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    purchase_id = %transaction.id(),
                    attempt,
                    error = %err,
                    "commit failed, retrying"
                );
                attempt += 1;
            }
            result => return result,
        }
    }
}
