//! Line item arithmetic and editing.
//!
//! Every operation returns a new vector; the input slice is never mutated.

use procura_shared::types::{round_money, within_amount_limit};
use rust_decimal::Decimal;

use super::error::LineItemError;
use super::types::{CatalogItem, LineItem, LineItemField, LineItemUpdate};
use crate::units::UnitConversionResolver;

/// Computes line totals and applies item edits.
#[derive(Debug, Clone, Copy)]
pub struct LineItemCalculator<'a> {
    units: UnitConversionResolver<'a>,
    default_markup: Decimal,
}

impl<'a> LineItemCalculator<'a> {
    /// Creates a calculator.
    ///
    /// `default_markup` seeds the sale price as `unit_cost * default_markup`
    /// when the catalog has no selling price.
    #[must_use]
    pub fn new(units: UnitConversionResolver<'a>, default_markup: Decimal) -> Self {
        Self {
            units,
            default_markup,
        }
    }

    /// `round(quantity * unit_price, 2)`.
    ///
    /// `None` when the product falls outside the accepted amount range.
    #[must_use]
    pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Option<Decimal> {
        quantity
            .checked_mul(unit_price)
            .map(round_money)
            .filter(|total| within_amount_limit(*total))
    }

    /// Catalog selling price, or the unit cost marked up.
    ///
    /// `None` when the price falls outside the accepted amount range.
    #[must_use]
    pub fn default_sale_price(&self, candidate: &CatalogItem) -> Option<Decimal> {
        let price = match candidate.selling_price {
            Some(price) => Some(price),
            None => candidate
                .unit_cost
                .checked_mul(self.default_markup)
                .map(round_money),
        };
        price.filter(|price| within_amount_limit(*price))
    }

    /// Adds a catalog record, or bumps the quantity of a matching line by one.
    ///
    /// Lines match on `(product_id, variant_id, variant_key)`.
    pub fn add_or_merge_item(
        &self,
        items: &[LineItem],
        candidate: &CatalogItem,
    ) -> Result<Vec<LineItem>, LineItemError> {
        let key = candidate.variant_key();
        let mut next = items.to_vec();

        if let Some((index, line)) = next
            .iter_mut()
            .enumerate()
            .find(|(_, line)| line.same_identity(candidate.product_id, candidate.variant_id, &key))
        {
            let quantity = line
                .purchase_quantity
                .checked_add(Decimal::ONE)
                .filter(|quantity| within_amount_limit(*quantity))
                .ok_or(LineItemError::AmountOutOfRange {
                    index,
                    field: LineItemField::PurchaseQuantity,
                })?;
            line.total_price = Self::checked_total(index, quantity, line.unit_price)?;
            line.purchase_quantity = quantity;
            return Ok(next);
        }

        let index = next.len();
        let unit_price = bounded(index, LineItemField::UnitPrice, candidate.unit_cost)?;
        let sale_price = self
            .default_sale_price(candidate)
            .ok_or(LineItemError::AmountOutOfRange {
                index,
                field: LineItemField::SalePrice,
            })?;
        let total_price = Self::checked_total(index, Decimal::ONE, unit_price)?;

        let resolution = self.units.resolve_family(&candidate.unit_type)?;
        let family = resolution.family;
        let purchase_unit = candidate
            .default_unit
            .as_deref()
            .filter(|unit| family.contains(unit))
            .unwrap_or_else(|| family.canonical_unit())
            .to_string();

        next.push(LineItem {
            product_id: candidate.product_id,
            variant_id: candidate.variant_id,
            variant_key: key,
            unit_family: family.name().to_string(),
            fallback_from: resolution
                .fell_back
                .then(|| candidate.unit_type.clone()),
            sale_unit: purchase_unit.clone(),
            purchase_unit,
            purchase_quantity: Decimal::ONE,
            unit_price,
            sale_price,
            transportation_cost: Decimal::ZERO,
            total_price,
        });
        Ok(next)
    }

    /// Applies a single field edit to the line at `index`.
    ///
    /// The total is recomputed whenever quantity or unit price changes.
    /// Values outside the accepted amount range are rejected; other
    /// out-of-range values such as negative prices are kept for the
    /// validator to report.
    pub fn update_item(
        &self,
        items: &[LineItem],
        index: usize,
        update: LineItemUpdate,
    ) -> Result<Vec<LineItem>, LineItemError> {
        let mut next = items.to_vec();
        let len = next.len();
        let line = next
            .get_mut(index)
            .ok_or(LineItemError::IndexOutOfRange { index, len })?;
        let field = update.field();

        match update {
            LineItemUpdate::PurchaseQuantity(quantity) => {
                let quantity = bounded(index, field, quantity)?;
                line.total_price = Self::checked_total(index, quantity, line.unit_price)?;
                line.purchase_quantity = quantity;
            }
            LineItemUpdate::UnitPrice(price) => {
                let price = bounded(index, field, price)?;
                line.total_price = Self::checked_total(index, line.purchase_quantity, price)?;
                line.unit_price = price;
            }
            LineItemUpdate::SalePrice(price) => line.sale_price = bounded(index, field, price)?,
            LineItemUpdate::TransportationCost(cost) => {
                line.transportation_cost = bounded(index, field, cost)?;
            }
            LineItemUpdate::PurchaseUnit(unit) => {
                let sale_unit =
                    self.units
                        .revalidate_sale_unit(&line.unit_family, &unit, &line.sale_unit)?;
                line.purchase_unit = unit;
                line.sale_unit = sale_unit;
            }
            LineItemUpdate::SaleUnit(unit) => {
                self.units
                    .check_sale_unit(&line.unit_family, &line.purchase_unit, &unit)?;
                line.sale_unit = unit;
            }
        }
        Ok(next)
    }

    /// Removes the line at `index`.
    pub fn remove_item(items: &[LineItem], index: usize) -> Result<Vec<LineItem>, LineItemError> {
        if index >= items.len() {
            return Err(LineItemError::IndexOutOfRange {
                index,
                len: items.len(),
            });
        }
        let mut next = items.to_vec();
        next.remove(index);
        Ok(next)
    }

    /// Sum of line totals, rounded once at the end.
    #[must_use]
    pub fn subtotal(items: &[LineItem]) -> Decimal {
        round_money(saturating_sum(items.iter().map(|line| line.total_price)))
    }

    /// Sum of per-line transportation surcharges.
    #[must_use]
    pub fn item_transportation_total(items: &[LineItem]) -> Decimal {
        round_money(saturating_sum(
            items.iter().map(|line| line.transportation_cost),
        ))
    }

    /// Item subtotal plus per-line and shipment-level transportation.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing; lines built
    /// through the calculator never get near it.
    #[must_use]
    pub fn grand_total(items: &[LineItem], shipment_transportation: Decimal) -> Decimal {
        round_money(saturating_sum([
            Self::subtotal(items),
            Self::item_transportation_total(items),
            shipment_transportation,
        ]))
    }

    fn checked_total(
        index: usize,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<Decimal, LineItemError> {
        Self::line_total(quantity, unit_price).ok_or(LineItemError::AmountOutOfRange {
            index,
            field: LineItemField::TotalPrice,
        })
    }
}

fn bounded(index: usize, field: LineItemField, value: Decimal) -> Result<Decimal, LineItemError> {
    if within_amount_limit(value) {
        Ok(value)
    } else {
        Err(LineItemError::AmountOutOfRange { index, field })
    }
}

fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}
