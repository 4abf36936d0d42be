//! Purchase draft and its pure reducer.
//!
//! A draft stores only what the user chose. Totals and the payment
//! snapshot are recomputed from it on demand, so the paid amount shown
//! can never drift from the one implied by the payment state.

use chrono::NaiveDate;
use procura_shared::types::{PurchaseId, SupplierId, WarehouseId, within_amount_limit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::EngineContext;
use super::error::{EditError, ReconcileError};
use super::event::PurchaseEvent;
use crate::line_item::{LineItem, LineItemCalculator, LineItemUpdate};
use crate::payment::{PaymentSnapshot, PaymentState};

/// A purchase being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    /// Identifier, fixed for the life of the draft.
    pub id: PurchaseId,
    /// Supplier.
    pub supplier_id: Option<SupplierId>,
    /// Receiving warehouse.
    pub warehouse_id: Option<WarehouseId>,
    /// Purchase date; anchors installment due dates.
    pub purchase_date: Option<NaiveDate>,
    /// Line items in entry order.
    pub line_items: Vec<LineItem>,
    /// Shipment-level transportation cost.
    pub transportation_cost: Decimal,
    /// Payment inputs.
    pub payment: PaymentState,
}

impl PurchaseDraft {
    /// Creates an empty draft with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty draft for a known identifier.
    #[must_use]
    pub fn with_id(id: PurchaseId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Applies one event, returning the next draft.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` when a line item edit targets a missing line
    /// or an unknown unit, or when an amount is outside the accepted range.
    /// The input draft is left untouched.
    pub fn apply(&self, event: &PurchaseEvent, ctx: &EngineContext<'_>) -> Result<Self, ReconcileError> {
        let reject = |source: EditError| ReconcileError {
            event: event.kind(),
            source,
        };
        let bounded = |amount: Decimal| {
            if within_amount_limit(amount) {
                Ok(amount)
            } else {
                Err(reject(EditError::AmountOutOfRange(amount)))
            }
        };
        let calculator = ctx.calculator();
        let reconciler = ctx.reconciler();
        let mut next = self.clone();

        match event {
            PurchaseEvent::SetSupplier(id) => next.supplier_id = Some(*id),
            PurchaseEvent::SetWarehouse(id) => next.warehouse_id = Some(*id),
            PurchaseEvent::SetPurchaseDate(date) => next.purchase_date = Some(*date),
            PurchaseEvent::AddItem(candidate) => {
                next.line_items = calculator
                    .add_or_merge_item(&self.line_items, candidate)
                    .map_err(|err| reject(err.into()))?;
            }
            PurchaseEvent::RemoveItem { index } => {
                next.line_items = LineItemCalculator::remove_item(&self.line_items, *index)
                    .map_err(|err| reject(err.into()))?;
            }
            PurchaseEvent::UpdateItem { index, update } => {
                next.line_items = calculator
                    .update_item(&self.line_items, *index, update.clone())
                    .map_err(|err| reject(err.into()))?;
            }
            PurchaseEvent::SetUnit { index, unit } => {
                next.line_items = calculator
                    .update_item(
                        &self.line_items,
                        *index,
                        LineItemUpdate::PurchaseUnit(unit.clone()),
                    )
                    .map_err(|err| reject(err.into()))?;
            }
            PurchaseEvent::SetTransportationCost(amount) => {
                next.transportation_cost = bounded(*amount)?;
            }
            PurchaseEvent::SetPaymentStatus(status) => {
                next.payment = reconciler.select_status(&self.payment, *status, self.grand_total());
            }
            PurchaseEvent::SetInstallmentPlan(plan) => {
                next.payment = reconciler.set_installment_plan(&self.payment, *plan);
            }
            PurchaseEvent::SetPaymentAccount(account) => {
                next.payment = reconciler.set_payment_account(&self.payment, *account);
            }
            PurchaseEvent::SetPaidAmount(amount) => {
                next.payment = reconciler.set_paid_amount(&self.payment, bounded(*amount)?);
            }
            PurchaseEvent::ToggleAdvance(enabled) => {
                next.payment = reconciler.toggle_advance(&self.payment, *enabled);
            }
            PurchaseEvent::SetAdvanceAmount(amount) => {
                next.payment = reconciler.set_advance_amount(&self.payment, bounded(*amount)?);
            }
            PurchaseEvent::SetManualOverride(engaged) => {
                next.payment = reconciler.set_manual_override(
                    &self.payment,
                    *engaged,
                    self.grand_total(),
                    ctx.advance_balance(self.supplier_id),
                );
            }
        }

        debug!(
            purchase_id = %next.id,
            event = event.kind(),
            lines = next.line_items.len(),
            grand_total = %next.grand_total(),
            "purchase event applied"
        );
        Ok(next)
    }

    /// Applies events in order.
    ///
    /// # Errors
    ///
    /// Stops at the first event that cannot be applied.
    pub fn apply_all<'e, I>(&self, events: I, ctx: &EngineContext<'_>) -> Result<Self, ReconcileError>
    where
        I: IntoIterator<Item = &'e PurchaseEvent>,
    {
        events
            .into_iter()
            .try_fold(self.clone(), |draft, event| draft.apply(event, ctx))
    }

    /// Line totals plus per-line and shipment transportation.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        LineItemCalculator::grand_total(&self.line_items, self.transportation_cost)
    }

    /// Derived payment figures for the current grand total.
    #[must_use]
    pub fn payment_snapshot(&self, ctx: &EngineContext<'_>) -> PaymentSnapshot {
        ctx.reconciler().reconcile(
            &self.payment,
            self.grand_total(),
            ctx.advance_balance(self.supplier_id),
        )
    }

    /// `max(0, grand_total - paid_amount)`.
    #[must_use]
    pub fn due_amount(&self, ctx: &EngineContext<'_>) -> Decimal {
        self.payment_snapshot(ctx).due_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advance::SupplierAccount;
    use crate::line_item::{CatalogItem, LineItemError, LineItemField};
    use crate::payment::{InstallmentPlan, PaymentStatus};
    use crate::units::UnitRegistry;
    use procura_shared::EngineConfig;
    use procura_shared::types::{PaymentAccountId, ProductId};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn catalog(unit_type: &str, default_unit: &str, unit_cost: Decimal) -> CatalogItem {
        CatalogItem {
            product_id: ProductId::new(),
            variant_id: None,
            unit_type: unit_type.to_string(),
            default_unit: Some(default_unit.to_string()),
            unit_cost,
            selling_price: None,
            attributes: BTreeMap::new(),
        }
    }

    /// One 1000.00 line from a known supplier.
    fn thousand_draft(ctx: &EngineContext<'_>, supplier_id: SupplierId) -> PurchaseDraft {
        PurchaseDraft::new()
            .apply_all(
                &[
                    PurchaseEvent::SetSupplier(supplier_id),
                    PurchaseEvent::AddItem(catalog("piece", "piece", dec!(100))),
                    PurchaseEvent::UpdateItem {
                        index: 0,
                        update: LineItemUpdate::PurchaseQuantity(dec!(10)),
                    },
                ],
                ctx,
            )
            .unwrap()
    }

    #[test]
    fn test_weight_line_total() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);

        let draft = PurchaseDraft::new()
            .apply_all(
                &[
                    PurchaseEvent::AddItem(catalog("weight", "kg", dec!(50))),
                    PurchaseEvent::UpdateItem {
                        index: 0,
                        update: LineItemUpdate::PurchaseQuantity(dec!(10)),
                    },
                ],
                &ctx,
            )
            .unwrap();

        assert_eq!(draft.line_items[0].total_price, dec!(500));
        assert_eq!(draft.line_items[0].sale_price, dec!(60));
        assert_eq!(draft.grand_total(), dec!(500));
        assert_eq!(
            ctx.resolver().available_sale_units("weight", "kg").unwrap(),
            vec!["kg", "gram", "mg"]
        );
    }

    #[test]
    fn test_advance_pays_part() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let supplier = SupplierAccount::new(SupplierId::new(), dec!(400), dec!(0));
        let ctx = EngineContext::new(&units, &config).with_supplier(&supplier);

        let draft = thousand_draft(&ctx, supplier.supplier_id)
            .apply(&PurchaseEvent::ToggleAdvance(true), &ctx)
            .unwrap();
        let snapshot = draft.payment_snapshot(&ctx);

        assert_eq!(snapshot.paid_amount, dec!(400));
        assert_eq!(snapshot.due_amount, dec!(600));
        assert_eq!(snapshot.status, PaymentStatus::Partial);
        assert_eq!(draft.due_amount(&ctx), dec!(600));
    }

    #[test]
    fn test_other_suppliers_credit_is_not_used() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let supplier = SupplierAccount::new(SupplierId::new(), dec!(400), dec!(0));
        let ctx = EngineContext::new(&units, &config).with_supplier(&supplier);

        let draft = thousand_draft(&ctx, SupplierId::new())
            .apply(&PurchaseEvent::ToggleAdvance(true), &ctx)
            .unwrap();
        assert_eq!(draft.payment_snapshot(&ctx).paid_amount, dec!(0));
    }

    #[test]
    fn test_paid_amount_follows_item_edits() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);

        let draft = thousand_draft(&ctx, SupplierId::new())
            .apply(&PurchaseEvent::SetPaymentStatus(PaymentStatus::Paid), &ctx)
            .unwrap()
            .apply(&PurchaseEvent::SetTransportationCost(dec!(25)), &ctx)
            .unwrap();

        let snapshot = draft.payment_snapshot(&ctx);
        assert_eq!(snapshot.paid_amount, dec!(1025));
        assert_eq!(snapshot.due_amount, dec!(0));
    }

    #[test]
    fn test_installment_scenario() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);

        let draft = PurchaseDraft::new()
            .apply_all(
                &[
                    PurchaseEvent::AddItem(catalog("piece", "piece", dec!(90))),
                    PurchaseEvent::UpdateItem {
                        index: 0,
                        update: LineItemUpdate::PurchaseQuantity(dec!(10)),
                    },
                    PurchaseEvent::SetInstallmentPlan(InstallmentPlan {
                        count: 3,
                        duration_months: 3,
                    }),
                    PurchaseEvent::SetPaymentStatus(PaymentStatus::Installment),
                    PurchaseEvent::SetPaymentAccount(Some(PaymentAccountId::new())),
                ],
                &ctx,
            )
            .unwrap();

        let snapshot = draft.payment_snapshot(&ctx);
        assert_eq!(
            snapshot.schedule.iter().map(|i| i.amount).collect::<Vec<_>>(),
            vec![dec!(300), dec!(300), dec!(300)]
        );
        assert_eq!(snapshot.paid_amount, dec!(300));
        assert_eq!(snapshot.due_amount, dec!(600));
    }

    #[test]
    fn test_partial_then_release_override() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);

        let draft = thousand_draft(&ctx, SupplierId::new())
            .apply(&PurchaseEvent::SetPaymentStatus(PaymentStatus::Partial), &ctx)
            .unwrap();
        assert_eq!(draft.payment_snapshot(&ctx).paid_amount, dec!(500));

        let draft = draft
            .apply(&PurchaseEvent::SetPaidAmount(dec!(650)), &ctx)
            .unwrap();
        assert_eq!(draft.payment_snapshot(&ctx).paid_amount, dec!(650));

        let draft = draft
            .apply(&PurchaseEvent::SetManualOverride(false), &ctx)
            .unwrap();
        assert_eq!(draft.payment_snapshot(&ctx).paid_amount, dec!(500));
    }

    #[test]
    fn test_set_unit_revalidates_sale_unit() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);

        let draft = PurchaseDraft::new()
            .apply_all(
                &[
                    PurchaseEvent::AddItem(catalog("weight", "ton", dec!(900))),
                    PurchaseEvent::UpdateItem {
                        index: 0,
                        update: LineItemUpdate::SaleUnit("ton".to_string()),
                    },
                    PurchaseEvent::SetUnit {
                        index: 0,
                        unit: "kg".to_string(),
                    },
                ],
                &ctx,
            )
            .unwrap();
        assert_eq!(draft.line_items[0].purchase_unit, "kg");
        assert_eq!(draft.line_items[0].sale_unit, "kg");
    }

    #[test]
    fn test_rejected_event_names_itself() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);

        let err = PurchaseDraft::new()
            .apply(&PurchaseEvent::RemoveItem { index: 3 }, &ctx)
            .unwrap_err();
        assert_eq!(err.event, "remove_item");
        assert_eq!(err.error_code(), "LINE_ITEM_INDEX_OUT_OF_RANGE");

        let err = PurchaseDraft::new()
            .apply(
                &PurchaseEvent::AddItem(catalog("energy", "kwh", dec!(1))),
                &ctx,
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_UNIT_FAMILY");
    }

    #[test]
    fn test_fallback_to_piece_is_recorded() {
        let units = UnitRegistry::standard();
        let config = EngineConfig {
            allow_unit_family_fallback: true,
            ..EngineConfig::default()
        };
        let ctx = EngineContext::new(&units, &config);

        let draft = PurchaseDraft::new()
            .apply(
                &PurchaseEvent::AddItem(catalog("energy", "kwh", dec!(1))),
                &ctx,
            )
            .unwrap();
        let line = &draft.line_items[0];
        assert_eq!(line.unit_family, "piece");
        assert_eq!(line.fallback_from.as_deref(), Some("energy"));
        assert_eq!(line.purchase_unit, "piece");
    }

    #[test]
    fn test_negative_edits_are_kept_for_validation() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);

        let draft = thousand_draft(&ctx, SupplierId::new())
            .apply(
                &PurchaseEvent::UpdateItem {
                    index: 0,
                    update: LineItemUpdate::UnitPrice(dec!(-5)),
                },
                &ctx,
            )
            .unwrap();
        assert_eq!(draft.line_items[0].unit_price, dec!(-5));
        assert_eq!(
            LineItemUpdate::UnitPrice(dec!(-5)).field(),
            LineItemField::UnitPrice
        );
    }

    #[test]
    fn test_huge_quantity_is_rejected_without_panicking() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);
        let draft = thousand_draft(&ctx, SupplierId::new())
            .apply(
                &PurchaseEvent::UpdateItem {
                    index: 0,
                    update: LineItemUpdate::UnitPrice(dec!(100000)),
                },
                &ctx,
            )
            .unwrap();

        let err = draft
            .apply(
                &PurchaseEvent::UpdateItem {
                    index: 0,
                    update: LineItemUpdate::PurchaseQuantity(dec!(10000000000000000000000000)),
                },
                &ctx,
            )
            .unwrap_err();
        assert_eq!(err.event, "update_item");
        assert_eq!(
            err.source,
            EditError::LineItem(LineItemError::AmountOutOfRange {
                index: 0,
                field: LineItemField::PurchaseQuantity,
            })
        );
        assert_eq!(err.error_code(), "LINE_ITEM_AMOUNT_OUT_OF_RANGE");
        // the draft is untouched and still totals normally
        assert_eq!(draft.grand_total(), dec!(1000000));
    }

    #[test]
    fn test_huge_purchase_amounts_are_rejected() {
        let units = UnitRegistry::standard();
        let config = EngineConfig::default();
        let ctx = EngineContext::new(&units, &config);
        let draft = thousand_draft(&ctx, SupplierId::new());
        let huge = Decimal::MIN;

        for event in [
            PurchaseEvent::SetTransportationCost(huge),
            PurchaseEvent::SetPaidAmount(huge),
            PurchaseEvent::SetAdvanceAmount(huge),
        ] {
            let err = draft.apply(&event, &ctx).unwrap_err();
            assert_eq!(err.source, EditError::AmountOutOfRange(huge));
            assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
        }
    }
}
