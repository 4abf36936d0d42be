//! Property-based tests for the purchase reducer.
//!
//! Random edit histories must leave every derived figure consistent.

use proptest::prelude::*;
use procura_shared::EngineConfig;
use procura_shared::types::{PaymentAccountId, ProductId, SupplierId, round_money};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::context::EngineContext;
use super::draft::PurchaseDraft;
use super::event::PurchaseEvent;
use crate::advance::{AdvanceCreditLedger, SupplierAccount};
use crate::line_item::{CatalogItem, LineItemUpdate};
use crate::payment::{InstallmentPlan, PaymentStatus};
use crate::units::UnitRegistry;

const WEIGHT_UNITS: [&str; 4] = ["ton", "kg", "gram", "mg"];

/// Amounts from 0.01 to 10,000.00.
fn money() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn unit() -> impl Strategy<Value = String> {
    prop::sample::select(WEIGHT_UNITS.to_vec()).prop_map(str::to_string)
}

fn status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Unpaid),
        Just(PaymentStatus::Partial),
        Just(PaymentStatus::Paid),
        Just(PaymentStatus::Installment),
    ]
}

/// Events that never target a missing line (index 0 is always added first).
fn event() -> impl Strategy<Value = PurchaseEvent> {
    prop_oneof![
        (money(), unit()).prop_map(|(unit_cost, unit)| PurchaseEvent::AddItem(CatalogItem {
            product_id: ProductId::new(),
            variant_id: None,
            unit_type: "weight".to_string(),
            default_unit: Some(unit),
            unit_cost,
            selling_price: None,
            attributes: BTreeMap::new(),
        })),
        money().prop_map(|q| PurchaseEvent::UpdateItem {
            index: 0,
            update: LineItemUpdate::PurchaseQuantity(q),
        }),
        money().prop_map(|p| PurchaseEvent::UpdateItem {
            index: 0,
            update: LineItemUpdate::UnitPrice(p),
        }),
        money().prop_map(|c| PurchaseEvent::UpdateItem {
            index: 0,
            update: LineItemUpdate::TransportationCost(c),
        }),
        unit().prop_map(|unit| PurchaseEvent::SetUnit { index: 0, unit }),
        money().prop_map(PurchaseEvent::SetTransportationCost),
        status().prop_map(PurchaseEvent::SetPaymentStatus),
        (1u32..=12, 1u32..=24).prop_map(|(count, duration_months)| {
            PurchaseEvent::SetInstallmentPlan(InstallmentPlan {
                count,
                duration_months,
            })
        }),
        any::<bool>().prop_map(PurchaseEvent::ToggleAdvance),
        any::<bool>().prop_map(PurchaseEvent::SetManualOverride),
    ]
}

fn replay(events: &[PurchaseEvent], advance: Decimal) -> (PurchaseDraft, Decimal, Decimal) {
    let units = UnitRegistry::standard();
    let config = EngineConfig::default();
    let supplier = SupplierAccount::new(SupplierId::new(), advance, Decimal::ZERO);
    let ctx = EngineContext::new(&units, &config).with_supplier(&supplier);

    let seed = PurchaseDraft::new()
        .apply_all(
            &[
                PurchaseEvent::SetSupplier(supplier.supplier_id),
                PurchaseEvent::SetPaymentAccount(Some(PaymentAccountId::new())),
                PurchaseEvent::AddItem(CatalogItem {
                    product_id: ProductId::new(),
                    variant_id: None,
                    unit_type: "weight".to_string(),
                    default_unit: Some("kg".to_string()),
                    unit_cost: Decimal::ONE,
                    selling_price: None,
                    attributes: BTreeMap::new(),
                }),
            ],
            &ctx,
        )
        .unwrap();
    let draft = seed.apply_all(events, &ctx).unwrap();
    let snapshot = draft.payment_snapshot(&ctx);
    (draft, snapshot.paid_amount, snapshot.advance_applied)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Line totals and the grand total always follow the stored fields.
    #[test]
    fn prop_totals_consistent(events in prop::collection::vec(event(), 0..20)) {
        let (draft, _, _) = replay(&events, Decimal::ZERO);

        let mut expected = draft.transportation_cost;
        for line in &draft.line_items {
            prop_assert_eq!(
                line.total_price,
                round_money(line.purchase_quantity * line.unit_price)
            );
            expected += line.total_price + line.transportation_cost;
        }
        prop_assert_eq!(draft.grand_total(), round_money(expected));
    }

    /// Sale units never outgrow purchase units.
    #[test]
    fn prop_sale_unit_within_purchase_unit(events in prop::collection::vec(event(), 0..20)) {
        let (draft, _, _) = replay(&events, Decimal::ZERO);
        let units = UnitRegistry::standard();
        let weight = units.get("weight").unwrap();

        for line in &draft.line_items {
            prop_assert!(weight.factor(&line.sale_unit) <= weight.factor(&line.purchase_unit));
        }
    }

    /// Paid amount stays within the total and advance within its limit.
    #[test]
    fn prop_payment_bounds(
        events in prop::collection::vec(event(), 0..20),
        advance in (-100_000i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2)),
    ) {
        let (draft, paid, applied) = replay(&events, advance);
        let grand_total = draft.grand_total();

        prop_assert!(paid >= Decimal::ZERO);
        prop_assert!(paid <= grand_total || draft.payment.override_engaged());
        prop_assert!(applied <= AdvanceCreditLedger::max_applicable(advance, grand_total));
    }
}
