//! In-memory purchase store.
//!
//! All state sits behind one async mutex. A commit stages every change
//! against the locked state and only writes once all checks pass, so a
//! rejected commit leaves nothing behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use procura_core::advance::SupplierAccount;
use procura_core::purchase::{CommitPlan, PurchaseTransaction};
use procura_core::units::UnitRegistry;
use procura_shared::types::{
    PaymentAccountId, ProductId, PurchaseId, SupplierId, VariantId, WarehouseId, non_negative,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::CommitError;
use crate::store::{PurchaseStore, Receipt};

type StockKey = (WarehouseId, ProductId, Option<VariantId>);

#[derive(Debug, Default)]
struct StoreState {
    suppliers: HashMap<SupplierId, SupplierAccount>,
    accounts: HashMap<PaymentAccountId, Decimal>,
    stock: HashMap<StockKey, Decimal>,
    committed: HashMap<PurchaseId, (PurchaseTransaction, Receipt)>,
}

/// Changes one commit will write, computed before anything is written.
struct Staged {
    supplier: SupplierAccount,
    account: Option<(PaymentAccountId, Decimal)>,
}

/// Reference [`PurchaseStore`] backed by process memory.
///
/// Snapshots are re-checked against the store's own unit registry, so a
/// snapshot using extra unit families needs [`Self::with_units`].
#[derive(Debug)]
pub struct InMemoryPurchaseStore {
    state: Mutex<StoreState>,
    units: UnitRegistry,
    pending_failures: AtomicU32,
}

impl Default for InMemoryPurchaseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPurchaseStore {
    /// Creates an empty store using the standard unit families.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            units: UnitRegistry::standard(),
            pending_failures: AtomicU32::new(0),
        }
    }

    /// Replaces the unit families commits are checked against.
    #[must_use]
    pub fn with_units(mut self, units: UnitRegistry) -> Self {
        self.units = units;
        self
    }

    /// Seeds a supplier's balances.
    #[must_use]
    pub fn with_supplier(mut self, account: SupplierAccount) -> Self {
        self.state
            .get_mut()
            .suppliers
            .insert(account.supplier_id, account);
        self
    }

    /// Seeds a payment account balance.
    #[must_use]
    pub fn with_account(mut self, account_id: PaymentAccountId, balance: Decimal) -> Self {
        self.state.get_mut().accounts.insert(account_id, balance);
        self
    }

    /// Makes the next `count` commits fail with a retryable storage error
    /// before touching any state.
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Current balances of a supplier.
    pub async fn supplier(&self, supplier_id: SupplierId) -> Option<SupplierAccount> {
        self.state.lock().await.suppliers.get(&supplier_id).copied()
    }

    /// Current balance of a payment account.
    pub async fn account_balance(&self, account_id: PaymentAccountId) -> Option<Decimal> {
        self.state.lock().await.accounts.get(&account_id).copied()
    }

    /// Snapshot of every payment account balance.
    pub async fn account_balances(&self) -> HashMap<PaymentAccountId, Decimal> {
        self.state.lock().await.accounts.clone()
    }

    /// Stock on hand in canonical units.
    pub async fn stock(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        variant_id: Option<VariantId>,
    ) -> Decimal {
        self.state
            .lock()
            .await
            .stock
            .get(&(warehouse_id, product_id, variant_id))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Number of distinct purchases committed.
    pub async fn committed_count(&self) -> usize {
        self.state.lock().await.committed.len()
    }

    fn take_injected_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn stage(state: &StoreState, plan: &CommitPlan) -> Result<Staged, CommitError> {
        let current = state
            .suppliers
            .get(&plan.supplier_id)
            .ok_or(CommitError::UnknownSupplier(plan.supplier_id))?;

        let delta = plan.supplier_delta;
        let available = non_negative(current.advance_balance);
        if delta.advance_debit > available {
            return Err(CommitError::AdvanceExceeded {
                requested: delta.advance_debit,
                available,
            });
        }
        let supplier = SupplierAccount {
            advance_balance: current.advance_balance - delta.advance_debit,
            due_balance: current.due_balance + delta.due_credit,
            ..*current
        };

        let account = match plan.account_debit {
            Some(debit) => {
                let balance = state
                    .accounts
                    .get(&debit.account_id)
                    .copied()
                    .ok_or(CommitError::UnknownAccount(debit.account_id))?;
                if balance < debit.amount {
                    return Err(CommitError::InsufficientAccountBalance {
                        account_id: debit.account_id,
                        available: balance,
                        required: debit.amount,
                    });
                }
                Some((debit.account_id, balance - debit.amount))
            }
            None => None,
        };

        Ok(Staged { supplier, account })
    }
}

#[async_trait]
impl PurchaseStore for InMemoryPurchaseStore {
    async fn commit(&self, transaction: &PurchaseTransaction) -> Result<Receipt, CommitError> {
        transaction.check_invariants(&self.units)?;

        if self.take_injected_failure() {
            warn!(purchase_id = %transaction.id(), "injected storage failure");
            return Err(CommitError::Storage("injected failure".to_string()));
        }

        let mut state = self.state.lock().await;

        if let Some((stored, receipt)) = state.committed.get(&transaction.id()) {
            if stored != transaction {
                return Err(CommitError::DuplicateId(transaction.id()));
            }
            info!(purchase_id = %transaction.id(), "purchase already committed");
            return Ok(Receipt {
                replayed: true,
                ..receipt.clone()
            });
        }

        let plan = transaction.side_effects();
        let staged = Self::stage(&state, &plan)?;

        state.suppliers.insert(staged.supplier.supplier_id, staged.supplier);
        if let Some((account_id, balance)) = staged.account {
            state.accounts.insert(account_id, balance);
        }
        for posting in &plan.stock {
            *state
                .stock
                .entry((posting.warehouse_id, posting.product_id, posting.variant_id))
                .or_insert(Decimal::ZERO) += posting.canonical_quantity;
        }

        let receipt = Receipt {
            purchase_id: transaction.id(),
            committed_at: Utc::now(),
            grand_total: transaction.grand_total(),
            paid_amount: transaction.paid_amount(),
            due_amount: transaction.due_amount(),
            advance_applied: transaction.advance_applied(),
            plan,
            replayed: false,
        };
        state
            .committed
            .insert(transaction.id(), (transaction.clone(), receipt.clone()));

        info!(
            purchase_id = %receipt.purchase_id,
            supplier_id = %staged.supplier.supplier_id,
            grand_total = %receipt.grand_total,
            advance_applied = %receipt.advance_applied,
            stock_postings = receipt.plan.stock.len(),
            "purchase committed"
        );
        Ok(receipt)
    }

    async fn receipt(&self, id: PurchaseId) -> Option<Receipt> {
        self.state
            .lock()
            .await
            .committed
            .get(&id)
            .map(|(_, receipt)| receipt.clone())
    }
}
