//! Replay-and-validate entry point.

use procura_shared::types::{PaymentAccountId, PurchaseId};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::context::EngineContext;
use super::draft::PurchaseDraft;
use super::error::{PurchaseError, ReconcileError};
use super::event::PurchaseEvent;
use super::transaction::PurchaseTransaction;
use crate::validation::{TransactionValidator, ValidationErrors};

/// Purchase reconciliation operations.
pub struct PurchaseService;

impl PurchaseService {
    /// Rebuilds a draft from its edit history.
    ///
    /// # Errors
    ///
    /// Returns the first rejected event.
    pub fn replay(
        id: PurchaseId,
        events: &[PurchaseEvent],
        ctx: &EngineContext<'_>,
    ) -> Result<PurchaseDraft, ReconcileError> {
        PurchaseDraft::with_id(id).apply_all(events, ctx)
    }

    /// Validates a draft into a commit-ready snapshot.
    ///
    /// # Errors
    ///
    /// Returns every validation failure found.
    pub fn reconcile_and_validate<B>(
        draft: &PurchaseDraft,
        ctx: &EngineContext<'_>,
        account_balance: B,
    ) -> Result<PurchaseTransaction, ValidationErrors>
    where
        B: Fn(PaymentAccountId) -> Option<Decimal>,
    {
        TransactionValidator::validate(draft, ctx, account_balance)
    }

    /// Replays `events` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseError::Reconcile` for a rejected event and
    /// `PurchaseError::Invalid` when the replayed draft fails validation.
    #[instrument(skip_all, fields(purchase_id = %id, events = events.len()))]
    pub fn build<B>(
        id: PurchaseId,
        events: &[PurchaseEvent],
        ctx: &EngineContext<'_>,
        account_balance: B,
    ) -> Result<PurchaseTransaction, PurchaseError>
    where
        B: Fn(PaymentAccountId) -> Option<Decimal>,
    {
        let draft = Self::replay(id, events, ctx)?;
        let transaction = Self::reconcile_and_validate(&draft, ctx, account_balance)?;
        info!(
            stock_postings = transaction.stock().len(),
            due_amount = %transaction.due_amount(),
            "purchase ready to commit"
        );
        Ok(transaction)
    }
}
