//! Purchase and sale unit resolution.
//!
//! A sale unit may never be larger than the unit the goods were purchased
//! in: buying by the `kg` allows selling by the `kg` or `gram`, never by
//! the `ton`.

use rust_decimal::Decimal;
use tracing::warn;

use super::error::UnitError;
use super::types::{PIECE_FAMILY, UnitFamily, UnitRegistry};

/// Outcome of a family lookup that may fall back to `piece`.
#[derive(Debug, Clone, Copy)]
pub struct FamilyResolution<'a> {
    /// The family that was resolved.
    pub family: &'a UnitFamily,
    /// True when the requested family was unknown and `piece` was used instead.
    pub fell_back: bool,
}

/// Resolves valid purchase and sale units against a [`UnitRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct UnitConversionResolver<'a> {
    registry: &'a UnitRegistry,
    allow_fallback: bool,
}

impl<'a> UnitConversionResolver<'a> {
    /// Creates a strict resolver: unknown families are errors.
    #[must_use]
    pub fn new(registry: &'a UnitRegistry) -> Self {
        Self {
            registry,
            allow_fallback: false,
        }
    }

    /// Enables or disables the `piece` fallback in [`Self::resolve_family`].
    #[must_use]
    pub fn with_fallback(mut self, allow_fallback: bool) -> Self {
        self.allow_fallback = allow_fallback;
        self
    }

    /// Looks up a registered family.
    pub fn family(&self, name: &str) -> Result<&'a UnitFamily, UnitError> {
        self.registry
            .get(name)
            .ok_or_else(|| UnitError::UnknownUnitFamily(name.to_string()))
    }

    /// Looks up a family, falling back to `piece` when allowed.
    ///
    /// A fallback is logged and reported through `fell_back`.
    pub fn resolve_family(&self, name: &str) -> Result<FamilyResolution<'a>, UnitError> {
        match self.family(name) {
            Ok(family) => Ok(FamilyResolution {
                family,
                fell_back: false,
            }),
            Err(err) if !self.allow_fallback => Err(err),
            Err(err) => {
                let family = self.family(PIECE_FAMILY).map_err(|_| err)?;
                warn!(requested = name, fallback = PIECE_FAMILY, "unknown unit family");
                Ok(FamilyResolution {
                    family,
                    fell_back: true,
                })
            }
        }
    }

    /// All units of a family, largest first.
    pub fn available_units(&self, family: &str) -> Result<Vec<String>, UnitError> {
        let family = self.family(family)?;
        Ok(family
            .units_descending()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Units whose factor does not exceed the purchase unit's, largest first.
    pub fn available_sale_units(
        &self,
        family: &str,
        purchase_unit: &str,
    ) -> Result<Vec<String>, UnitError> {
        let family = self.family(family)?;
        let ceiling = family.require_factor(purchase_unit)?;
        Ok(family
            .units_descending()
            .into_iter()
            .filter(|unit| family.factor(unit).is_some_and(|f| f <= ceiling))
            .map(str::to_string)
            .collect())
    }

    /// Keeps `current_sale_unit` when still permissible, otherwise returns the purchase unit.
    pub fn revalidate_sale_unit(
        &self,
        family: &str,
        purchase_unit: &str,
        current_sale_unit: &str,
    ) -> Result<String, UnitError> {
        match self.check_sale_unit(family, purchase_unit, current_sale_unit) {
            Ok(()) => Ok(current_sale_unit.to_string()),
            Err(UnitError::SaleUnitTooLarge { .. } | UnitError::UnknownUnit { .. }) => {
                // the purchase unit itself must still be valid
                self.family(family)?.require_factor(purchase_unit)?;
                Ok(purchase_unit.to_string())
            }
            Err(err) => Err(err),
        }
    }

    /// Checks that `sale_unit` may be used with `purchase_unit`.
    pub fn check_sale_unit(
        &self,
        family: &str,
        purchase_unit: &str,
        sale_unit: &str,
    ) -> Result<(), UnitError> {
        self.unit_factors(family, purchase_unit, sale_unit).map(|_| ())
    }

    /// Factors of the purchase and sale units, once the pair is known to be permissible.
    pub fn unit_factors(
        &self,
        family: &str,
        purchase_unit: &str,
        sale_unit: &str,
    ) -> Result<(Decimal, Decimal), UnitError> {
        let family = self.family(family)?;
        let purchase_factor = family.require_factor(purchase_unit)?;
        let sale_factor = family.require_factor(sale_unit)?;
        if sale_factor > purchase_factor {
            return Err(UnitError::SaleUnitTooLarge {
                sale_unit: sale_unit.to_string(),
                purchase_unit: purchase_unit.to_string(),
            });
        }
        Ok((purchase_factor, sale_factor))
    }

    /// Converts `quantity` of `unit` into the family's canonical unit.
    pub fn to_canonical(
        &self,
        family: &str,
        unit: &str,
        quantity: Decimal,
    ) -> Result<Decimal, UnitError> {
        let factor = self.family(family)?.require_factor(unit)?;
        quantity
            .checked_mul(factor)
            .ok_or_else(|| UnitError::ConversionOverflow {
                family: family.to_string(),
                unit: unit.to_string(),
            })
    }
}
