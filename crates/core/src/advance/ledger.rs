//! Supplier store-credit arithmetic.
//!
//! A negative stored advance means the supplier owes money; it is never
//! usable as credit.

use procura_shared::types::{SupplierId, non_negative};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AdvanceError;

/// Supplier balances as read from the supplier directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierAccount {
    /// The supplier.
    pub supplier_id: SupplierId,
    /// Store credit held for the supplier.
    pub advance_balance: Decimal,
    /// Amount owed to the supplier.
    pub due_balance: Decimal,
}

impl SupplierAccount {
    /// Creates an account from explicit balances.
    #[must_use]
    pub fn new(supplier_id: SupplierId, advance_balance: Decimal, due_balance: Decimal) -> Self {
        Self {
            supplier_id,
            advance_balance,
            due_balance,
        }
    }

    /// Normalises a directory `advance`/`due` pair into net balances.
    ///
    /// `advance_balance = max(0, advance - due)`, `due_balance = max(0, due - advance)`.
    #[must_use]
    pub fn from_advance_due(supplier_id: SupplierId, advance: Decimal, due: Decimal) -> Self {
        Self {
            supplier_id,
            advance_balance: non_negative(advance - due),
            due_balance: non_negative(due - advance),
        }
    }
}

/// Result of applying advance credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceApplication {
    /// Advance balance after the debit.
    pub new_balance: Decimal,
    /// Amount applied to the transaction.
    pub applied: Decimal,
}

/// Supplier balance changes requested on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierBalanceDelta {
    /// Amount to debit from the advance balance.
    pub advance_debit: Decimal,
    /// Amount to add to the due balance.
    pub due_credit: Decimal,
}

/// Stateless advance credit calculations.
pub struct AdvanceCreditLedger;

impl AdvanceCreditLedger {
    /// Usable credit: `max(0, advance_balance)`.
    #[must_use]
    pub fn available_advance(account: &SupplierAccount) -> Decimal {
        non_negative(account.advance_balance)
    }

    /// `min(max(0, advance_balance), grand_total)`.
    #[must_use]
    pub fn max_applicable(advance_balance: Decimal, grand_total: Decimal) -> Decimal {
        non_negative(advance_balance).min(non_negative(grand_total))
    }

    /// Applies `amount` of credit against a transaction of `grand_total`.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceExceeded` when `amount` is above
    /// [`Self::max_applicable`] and `NegativeAmount` when it is below zero.
    pub fn apply(
        advance_balance: Decimal,
        amount: Decimal,
        grand_total: Decimal,
    ) -> Result<AdvanceApplication, AdvanceError> {
        if amount < Decimal::ZERO {
            return Err(AdvanceError::NegativeAmount);
        }
        let available = Self::max_applicable(advance_balance, grand_total);
        if amount > available {
            return Err(AdvanceError::AdvanceExceeded {
                requested: amount,
                available,
            });
        }
        Ok(AdvanceApplication {
            new_balance: advance_balance - amount,
            applied: amount,
        })
    }

    /// Balance changes for a committed purchase.
    #[must_use]
    pub fn balance_delta(advance_applied: Decimal, due_amount: Decimal) -> SupplierBalanceDelta {
        SupplierBalanceDelta {
            advance_debit: advance_applied,
            due_credit: due_amount,
        }
    }
}
