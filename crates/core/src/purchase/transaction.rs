//! Commit-ready purchase snapshot and the side effects it requests.

use chrono::NaiveDate;
use procura_shared::types::{
    PaymentAccountId, ProductId, PurchaseId, SupplierId, VariantId, WarehouseId, non_negative,
    within_amount_limit,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InvariantViolation;
use crate::advance::{AdvanceCreditLedger, SupplierBalanceDelta};
use crate::line_item::{LineItem, LineItemCalculator};
use crate::payment::{
    Installment, InstallmentPlan, InstallmentSchedule, PaymentSnapshot, PaymentStatus,
};
use crate::units::{UnitConversionResolver, UnitError, UnitRegistry};

/// Stock to add at a warehouse for one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockIncrement {
    /// Receiving warehouse.
    pub warehouse_id: WarehouseId,
    /// Product received.
    pub product_id: ProductId,
    /// Variant received, if any.
    pub variant_id: Option<VariantId>,
    /// Unit family of the quantities.
    pub unit_family: String,
    /// Purchase unit.
    pub unit: String,
    /// Quantity in the purchase unit.
    pub quantity: Decimal,
    /// Quantity in the family's canonical unit.
    pub canonical_quantity: Decimal,
}

/// Cash drawn from a payment account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDebit {
    /// Account debited.
    pub account_id: PaymentAccountId,
    /// Amount debited.
    pub amount: Decimal,
}

/// Every balance and stock change one commit must apply atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPlan {
    /// Purchase being committed.
    pub purchase_id: PurchaseId,
    /// Supplier whose balances change.
    pub supplier_id: SupplierId,
    /// Stock postings, one per line item.
    pub stock: Vec<StockIncrement>,
    /// Cash debit, absent when no cash is paid.
    pub account_debit: Option<AccountDebit>,
    /// Supplier advance debit and due credit.
    pub supplier_delta: SupplierBalanceDelta,
}

/// A validated purchase, ready to hand to the persistence collaborator.
///
/// Only [`crate::validation::TransactionValidator`] builds one; fields are
/// read through accessors so a snapshot cannot drift after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseTransaction {
    id: PurchaseId,
    supplier_id: SupplierId,
    warehouse_id: WarehouseId,
    purchase_date: Option<NaiveDate>,
    line_items: Vec<LineItem>,
    transportation_cost: Decimal,
    grand_total: Decimal,
    payment: PaymentSnapshot,
    stock: Vec<StockIncrement>,
}

impl PurchaseTransaction {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: PurchaseId,
        supplier_id: SupplierId,
        warehouse_id: WarehouseId,
        purchase_date: Option<NaiveDate>,
        line_items: Vec<LineItem>,
        transportation_cost: Decimal,
        payment: PaymentSnapshot,
        stock: Vec<StockIncrement>,
    ) -> Self {
        let grand_total = LineItemCalculator::grand_total(&line_items, transportation_cost);
        Self {
            id,
            supplier_id,
            warehouse_id,
            purchase_date,
            line_items,
            transportation_cost,
            grand_total,
            payment,
            stock,
        }
    }

    /// Purchase identifier; also the commit idempotency key.
    #[must_use]
    pub fn id(&self) -> PurchaseId {
        self.id
    }

    /// Supplier.
    #[must_use]
    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    /// Receiving warehouse.
    #[must_use]
    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    /// Purchase date, when one was set.
    #[must_use]
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        self.purchase_date
    }

    /// Line items.
    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Shipment-level transportation cost.
    #[must_use]
    pub fn transportation_cost(&self) -> Decimal {
        self.transportation_cost
    }

    /// Grand total.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    /// Full payment snapshot.
    #[must_use]
    pub fn payment(&self) -> &PaymentSnapshot {
        &self.payment
    }

    /// Payment status.
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment.status
    }

    /// Paid amount at creation, advance included.
    #[must_use]
    pub fn paid_amount(&self) -> Decimal {
        self.payment.paid_amount
    }

    /// Amount still owed to the supplier.
    #[must_use]
    pub fn due_amount(&self) -> Decimal {
        self.payment.due_amount
    }

    /// Advance credit applied.
    #[must_use]
    pub fn advance_applied(&self) -> Decimal {
        self.payment.advance_applied
    }

    /// Cash drawn from the payment account.
    #[must_use]
    pub fn cash_paid(&self) -> Decimal {
        self.payment.cash_paid
    }

    /// Payment account.
    #[must_use]
    pub fn payment_account_id(&self) -> Option<PaymentAccountId> {
        self.payment.payment_account_id
    }

    /// Installment plan.
    #[must_use]
    pub fn installment_plan(&self) -> Option<InstallmentPlan> {
        self.payment.installment_plan
    }

    /// Installment schedule.
    #[must_use]
    pub fn schedule(&self) -> &[Installment] {
        &self.payment.schedule
    }

    /// Stock postings.
    #[must_use]
    pub fn stock(&self) -> &[StockIncrement] {
        &self.stock
    }

    /// Side effects to apply on commit.
    #[must_use]
    pub fn side_effects(&self) -> CommitPlan {
        let account_debit = match self.payment.payment_account_id {
            Some(account_id) if self.payment.cash_paid > Decimal::ZERO => Some(AccountDebit {
                account_id,
                amount: self.payment.cash_paid,
            }),
            _ => None,
        };
        CommitPlan {
            purchase_id: self.id,
            supplier_id: self.supplier_id,
            stock: self.stock.clone(),
            account_debit,
            supplier_delta: AdvanceCreditLedger::balance_delta(
                self.payment.advance_applied,
                self.payment.due_amount,
            ),
        }
    }

    /// Re-verifies every invariant a validated snapshot holds.
    ///
    /// Unit factors are looked up in `units`, which must hold the families
    /// the snapshot was validated against.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn check_invariants(&self, units: &UnitRegistry) -> Result<(), InvariantViolation> {
        if self.line_items.is_empty() {
            return Err(InvariantViolation::NoLineItems);
        }
        let bounded_positive = |amount: Decimal| amount > Decimal::ZERO && within_amount_limit(amount);
        for (index, line) in self.line_items.iter().enumerate() {
            if !bounded_positive(line.purchase_quantity)
                || !bounded_positive(line.unit_price)
                || !bounded_positive(line.sale_price)
                || line.transportation_cost < Decimal::ZERO
                || !within_amount_limit(line.transportation_cost)
            {
                return Err(InvariantViolation::InvalidLineAmount { index });
            }
            if LineItemCalculator::line_total(line.purchase_quantity, line.unit_price)
                != Some(line.total_price)
            {
                return Err(InvariantViolation::LineTotalMismatch { index });
            }
        }
        if self.transportation_cost < Decimal::ZERO || !within_amount_limit(self.transportation_cost)
        {
            return Err(InvariantViolation::InvalidTransportationCost(
                self.transportation_cost,
            ));
        }

        let computed = LineItemCalculator::grand_total(&self.line_items, self.transportation_cost);
        if computed != self.grand_total {
            return Err(InvariantViolation::GrandTotalMismatch {
                stored: self.grand_total,
                computed,
            });
        }

        let p = &self.payment;
        if p.paid_amount < Decimal::ZERO || p.paid_amount > self.grand_total {
            return Err(InvariantViolation::PaidOutOfRange {
                paid_amount: p.paid_amount,
                grand_total: self.grand_total,
            });
        }
        if p.due_amount != non_negative(self.grand_total - p.paid_amount) {
            return Err(InvariantViolation::DueMismatch);
        }
        self.check_status()?;
        if p.advance_applied < Decimal::ZERO
            || p.cash_paid < Decimal::ZERO
            || p.advance_applied.checked_add(p.cash_paid) != Some(p.paid_amount)
        {
            return Err(InvariantViolation::PortionMismatch {
                advance_applied: p.advance_applied,
                cash_paid: p.cash_paid,
            });
        }
        let account_ok = match p.status {
            PaymentStatus::Unpaid => p.payment_account_id.is_none(),
            _ => p.paid_amount.is_zero() || p.payment_account_id.is_some(),
        };
        if !account_ok {
            return Err(InvariantViolation::AccountMismatch);
        }
        self.check_schedule()?;
        self.check_stock(UnitConversionResolver::new(units))
    }

    fn check_stock(&self, resolver: UnitConversionResolver<'_>) -> Result<(), InvariantViolation> {
        if self.stock.len() != self.line_items.len() {
            return Err(InvariantViolation::StockMismatch);
        }
        for (index, (posting, line)) in self.stock.iter().zip(&self.line_items).enumerate() {
            if posting.product_id != line.product_id
                || posting.variant_id != line.variant_id
                || posting.warehouse_id != self.warehouse_id
                || posting.unit_family != line.unit_family
                || posting.unit != line.purchase_unit
                || posting.quantity != line.purchase_quantity
            {
                return Err(InvariantViolation::StockMismatch);
            }
            let (purchase_factor, _) = resolver
                .unit_factors(&line.unit_family, &line.purchase_unit, &line.sale_unit)
                .map_err(|err| match err {
                    UnitError::SaleUnitTooLarge { .. } => {
                        InvariantViolation::SaleUnitTooLarge { index }
                    }
                    _ => InvariantViolation::UnknownUnit { index },
                })?;
            if line.purchase_quantity.checked_mul(purchase_factor) != Some(posting.canonical_quantity)
            {
                return Err(InvariantViolation::CanonicalQuantityMismatch { index });
            }
        }
        Ok(())
    }

    fn check_status(&self) -> Result<(), InvariantViolation> {
        let p = &self.payment;
        let consistent = match p.status {
            PaymentStatus::Unpaid => p.paid_amount.is_zero(),
            PaymentStatus::Paid => p.paid_amount == self.grand_total && !p.paid_amount.is_zero(),
            PaymentStatus::Partial => {
                p.paid_amount > Decimal::ZERO && p.paid_amount < self.grand_total
            }
            PaymentStatus::Installment => true,
        };
        if consistent {
            Ok(())
        } else {
            Err(InvariantViolation::StatusMismatch {
                status: p.status,
                paid_amount: p.paid_amount,
            })
        }
    }

    fn check_schedule(&self) -> Result<(), InvariantViolation> {
        let p = &self.payment;
        let consistent = match (p.status, p.installment_plan) {
            (PaymentStatus::Installment, Some(plan)) => {
                plan.is_valid()
                    && p.schedule.len() == plan.count as usize
                    && InstallmentSchedule::total(&p.schedule) == Some(self.grand_total)
                    && p.schedule.first().map(|first| first.amount) == Some(p.paid_amount)
            }
            (PaymentStatus::Installment, None) => false,
            (_, plan) => plan.is_none() && p.schedule.is_empty(),
        };
        if consistent {
            Ok(())
        } else {
            Err(InvariantViolation::ScheduleMismatch)
        }
    }
}
