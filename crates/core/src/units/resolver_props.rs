//! Property-based tests for sale unit resolution.

use proptest::prelude::*;

use super::resolver::UnitConversionResolver;
use super::types::UnitRegistry;

fn arb_family_and_unit() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![
        Just(("weight", "ton")),
        Just(("weight", "kg")),
        Just(("weight", "gram")),
        Just(("weight", "mg")),
        Just(("volume", "kiloliter")),
        Just(("volume", "liter")),
        Just(("volume", "ml")),
        Just(("piece", "gross")),
        Just(("piece", "dozen")),
        Just(("piece", "piece")),
        Just(("length", "km")),
        Just(("length", "meter")),
        Just(("length", "cm")),
        Just(("length", "mm")),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// No offered sale unit is larger than the purchase unit, and the purchase unit is offered.
    #[test]
    fn prop_sale_units_never_exceed_purchase_unit((family, unit) in arb_family_and_unit()) {
        let registry = UnitRegistry::standard();
        let resolver = UnitConversionResolver::new(&registry);
        let fam = registry.get(family).unwrap();
        let ceiling = fam.factor(unit).unwrap();

        let sale_units = resolver.available_sale_units(family, unit).unwrap();
        prop_assert!(sale_units.iter().any(|u| u == unit));
        for sale_unit in &sale_units {
            prop_assert!(fam.factor(sale_unit).unwrap() <= ceiling);
        }
    }

    /// Sale units are listed largest first.
    #[test]
    fn prop_sale_units_are_sorted_descending((family, unit) in arb_family_and_unit()) {
        let registry = UnitRegistry::standard();
        let resolver = UnitConversionResolver::new(&registry);
        let fam = registry.get(family).unwrap();

        let sale_units = resolver.available_sale_units(family, unit).unwrap();
        for pair in sale_units.windows(2) {
            prop_assert!(fam.factor(&pair[0]).unwrap() >= fam.factor(&pair[1]).unwrap());
        }
    }

    /// Revalidation always yields a permissible sale unit.
    #[test]
    fn prop_revalidated_sale_unit_is_permissible(
        (family, purchase) in arb_family_and_unit(),
        (_, previous) in arb_family_and_unit(),
    ) {
        let registry = UnitRegistry::standard();
        let resolver = UnitConversionResolver::new(&registry);

        let sale_unit = resolver.revalidate_sale_unit(family, purchase, previous).unwrap();
        prop_assert!(resolver.check_sale_unit(family, purchase, &sale_unit).is_ok());
    }
}
