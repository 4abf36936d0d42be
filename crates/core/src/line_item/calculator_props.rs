//! Property-based tests for line item arithmetic.

use proptest::prelude::*;
use procura_shared::types::{ProductId, round_money};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::calculator::LineItemCalculator;
use super::types::{CatalogItem, LineItem, LineItemUpdate};
use crate::units::{UnitConversionResolver, UnitRegistry};

/// Quantities from 0.001 to 10,000.000.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|milli| Decimal::new(milli, 3))
}

/// Prices from 0.0001 to 100,000.0000.
fn price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Amounts from 0.00 to 10,000.00.
fn surcharge() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn build_lines(specs: &[(Decimal, Decimal, Decimal)]) -> Vec<LineItem> {
    let registry = UnitRegistry::standard();
    let calc = LineItemCalculator::new(UnitConversionResolver::new(&registry), Decimal::ONE);
    let mut items = Vec::new();
    for (qty, unit_price, transport) in specs {
        let candidate = CatalogItem {
            product_id: ProductId::new(),
            variant_id: None,
            unit_type: "piece".to_string(),
            default_unit: None,
            unit_cost: Decimal::ONE,
            selling_price: None,
            attributes: BTreeMap::new(),
        };
        items = calc.add_or_merge_item(&items, &candidate).unwrap();
        let index = items.len() - 1;
        items = calc.update_item(&items, index, LineItemUpdate::PurchaseQuantity(*qty)).unwrap();
        items = calc.update_item(&items, index, LineItemUpdate::UnitPrice(*unit_price)).unwrap();
        items = calc
            .update_item(&items, index, LineItemUpdate::TransportationCost(*transport))
            .unwrap();
    }
    items
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every line total equals round(quantity * unit_price, 2) after any edit sequence.
    #[test]
    fn prop_line_total_matches_rounded_product(
        specs in prop::collection::vec((quantity(), price(), surcharge()), 1..8)
    ) {
        let items = build_lines(&specs);
        for line in &items {
            prop_assert_eq!(
                line.total_price,
                round_money(line.purchase_quantity * line.unit_price)
            );
        }
    }

    /// Grand total is the sum of line totals, line surcharges, and the shipment surcharge.
    #[test]
    fn prop_grand_total_composition(
        specs in prop::collection::vec((quantity(), price(), surcharge()), 0..8),
        shipment in surcharge(),
    ) {
        let items = build_lines(&specs);
        let expected: Decimal = items.iter().map(|l| l.total_price).sum::<Decimal>()
            + items.iter().map(|l| l.transportation_cost).sum::<Decimal>()
            + shipment;
        prop_assert_eq!(LineItemCalculator::grand_total(&items, shipment), expected);
    }
}
