//! Final gate before commit.
//!
//! Every check runs; problems are collected rather than short-circuited so
//! the caller can surface them all at once.

use procura_shared::types::{PaymentAccountId, SupplierId, WarehouseId, within_amount_limit};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::error::{ReferenceField, ValidationError, ValidationErrors};
use crate::advance::{AdvanceCreditLedger, AdvanceError};
use crate::line_item::{LineItem, LineItemCalculator, LineItemField};
use crate::payment::{InstallmentSchedule, PaymentSnapshot, PaymentStatus};
use crate::purchase::{EngineContext, PurchaseDraft, PurchaseTransaction, StockIncrement};
use crate::units::{UnitConversionResolver, UnitError};

/// Validates drafts and builds commit-ready snapshots.
pub struct TransactionValidator;

impl TransactionValidator {
    /// Validates `draft` and returns a commit-ready snapshot.
    ///
    /// `account_balance` looks up the current balance of a payment account,
    /// returning `None` for accounts the directory does not know.
    ///
    /// # Errors
    ///
    /// Returns every validation failure found.
    pub fn validate<B>(
        draft: &PurchaseDraft,
        ctx: &EngineContext<'_>,
        account_balance: B,
    ) -> Result<PurchaseTransaction, ValidationErrors>
    where
        B: Fn(PaymentAccountId) -> Option<Decimal>,
    {
        let mut errors = Vec::new();

        if draft.line_items.is_empty() {
            errors.push(ValidationError::EmptyTransaction);
        }
        if draft.supplier_id.is_none() {
            errors.push(ValidationError::MissingReference {
                field: ReferenceField::Supplier,
            });
        }
        if draft.warehouse_id.is_none() {
            errors.push(ValidationError::MissingReference {
                field: ReferenceField::Warehouse,
            });
        }

        let resolver = ctx.resolver();
        let mut canonical = Vec::with_capacity(draft.line_items.len());
        for (index, line) in draft.line_items.iter().enumerate() {
            let (fields, canonical_quantity) = Self::line_problems(line, resolver);
            errors.extend(
                fields
                    .into_iter()
                    .map(|field| ValidationError::InvalidLineItem { index, field }),
            );
            canonical.extend(canonical_quantity);
        }
        if draft.transportation_cost < Decimal::ZERO
            || !within_amount_limit(draft.transportation_cost)
        {
            errors.push(ValidationError::InvalidTransportationCost);
        }

        let grand_total = draft.grand_total();
        let snapshot = draft.payment_snapshot(ctx);
        let advance_balance = ctx.advance_balance(draft.supplier_id);
        errors.extend(Self::payment_problems(
            &snapshot,
            grand_total,
            advance_balance,
            &account_balance,
        ));

        match (draft.supplier_id, draft.warehouse_id) {
            // every line without a canonical quantity was reported above
            (Some(supplier_id), Some(warehouse_id))
                if errors.is_empty() && canonical.len() == draft.line_items.len() =>
            {
                let stock = draft
                    .line_items
                    .iter()
                    .zip(canonical)
                    .map(|(line, canonical_quantity)| StockIncrement {
                        warehouse_id,
                        product_id: line.product_id,
                        variant_id: line.variant_id,
                        unit_family: line.unit_family.clone(),
                        unit: line.purchase_unit.clone(),
                        quantity: line.purchase_quantity,
                        canonical_quantity,
                    })
                    .collect();
                Ok(Self::finish(draft, supplier_id, warehouse_id, snapshot, stock))
            }
            _ => {
                debug!(
                    purchase_id = %draft.id,
                    errors = errors.len(),
                    "purchase failed validation"
                );
                Err(ValidationErrors::new(errors))
            }
        }
    }

    fn finish(
        draft: &PurchaseDraft,
        supplier_id: SupplierId,
        warehouse_id: WarehouseId,
        mut snapshot: PaymentSnapshot,
        stock: Vec<StockIncrement>,
    ) -> PurchaseTransaction {
        if let Some(date) = draft.purchase_date {
            snapshot.schedule = InstallmentSchedule::with_due_dates(&snapshot.schedule, date);
        }
        let transaction = PurchaseTransaction::new(
            draft.id,
            supplier_id,
            warehouse_id,
            draft.purchase_date,
            draft.line_items.clone(),
            draft.transportation_cost,
            snapshot,
            stock,
        );
        info!(
            purchase_id = %transaction.id(),
            grand_total = %transaction.grand_total(),
            paid_amount = %transaction.paid_amount(),
            status = %transaction.payment_status(),
            "purchase validated"
        );
        transaction
    }

    /// Fields of one line that fail validation, in field order, and the
    /// purchase quantity in canonical units when the units resolve.
    fn line_problems(
        line: &LineItem,
        resolver: UnitConversionResolver<'_>,
    ) -> (Vec<LineItemField>, Option<Decimal>) {
        let invalid = |amount: Decimal| amount <= Decimal::ZERO || !within_amount_limit(amount);
        let mut fields = Vec::new();
        if invalid(line.purchase_quantity) {
            fields.push(LineItemField::PurchaseQuantity);
        }
        if invalid(line.unit_price) {
            fields.push(LineItemField::UnitPrice);
        }
        if invalid(line.sale_price) {
            fields.push(LineItemField::SalePrice);
        }
        if LineItemCalculator::line_total(line.purchase_quantity, line.unit_price)
            != Some(line.total_price)
        {
            fields.push(LineItemField::TotalPrice);
        }

        let canonical = match resolver.unit_factors(
            &line.unit_family,
            &line.purchase_unit,
            &line.sale_unit,
        ) {
            Ok((purchase_factor, _)) => {
                let canonical = line.purchase_quantity.checked_mul(purchase_factor);
                if canonical.is_none() && !fields.contains(&LineItemField::PurchaseQuantity) {
                    fields.push(LineItemField::PurchaseQuantity);
                }
                canonical
            }
            Err(UnitError::UnknownUnit { unit, .. }) if unit == line.sale_unit => {
                fields.push(LineItemField::SaleUnit);
                None
            }
            Err(UnitError::SaleUnitTooLarge { .. }) => {
                fields.push(LineItemField::SaleUnit);
                None
            }
            Err(_) => {
                fields.push(LineItemField::PurchaseUnit);
                None
            }
        };
        if line.transportation_cost < Decimal::ZERO || !within_amount_limit(line.transportation_cost) {
            fields.push(LineItemField::TransportationCost);
        }
        (fields, canonical)
    }

    fn payment_problems<B>(
        snapshot: &PaymentSnapshot,
        grand_total: Decimal,
        advance_balance: Decimal,
        account_balance: &B,
    ) -> Vec<ValidationError>
    where
        B: Fn(PaymentAccountId) -> Option<Decimal>,
    {
        let mut errors = Vec::new();
        let invalid_paid = ValidationError::InvalidPaidAmount {
            paid_amount: snapshot.paid_amount,
            grand_total,
        };

        if snapshot.paid_amount < Decimal::ZERO
            || !within_amount_limit(snapshot.paid_amount)
            || (snapshot.paid_amount > Decimal::ZERO && snapshot.paid_amount > grand_total)
        {
            errors.push(invalid_paid.clone());
        }

        if snapshot.advance_applied != Decimal::ZERO {
            match AdvanceCreditLedger::apply(advance_balance, snapshot.advance_applied, grand_total) {
                Ok(_) => {}
                Err(AdvanceError::AdvanceExceeded {
                    requested,
                    available,
                }) => errors.push(ValidationError::AdvanceExceeded {
                    requested,
                    available,
                }),
                Err(AdvanceError::NegativeAmount) => {
                    if !errors.contains(&invalid_paid) {
                        errors.push(invalid_paid.clone());
                    }
                }
            }
        }

        match snapshot.payment_account_id {
            None if snapshot.paid_amount > Decimal::ZERO => {
                errors.push(ValidationError::MissingPaymentAccount);
            }
            None => {}
            Some(account_id) => match account_balance(account_id) {
                None => errors.push(ValidationError::UnknownPaymentAccount(account_id)),
                Some(available) if available < snapshot.cash_paid => {
                    errors.push(ValidationError::InsufficientAccountBalance {
                        account_id,
                        available,
                        required: snapshot.cash_paid,
                    });
                }
                Some(_) => {}
            },
        }

        if snapshot.status == PaymentStatus::Installment {
            match snapshot.installment_plan {
                Some(plan) if plan.is_valid() => {
                    if InstallmentSchedule::total(&snapshot.schedule) != Some(grand_total)
                        && !errors.contains(&invalid_paid)
                    {
                        errors.push(invalid_paid);
                    }
                }
                _ => errors.push(ValidationError::InvalidInstallmentPlan),
            }
        }
        errors
    }
}
