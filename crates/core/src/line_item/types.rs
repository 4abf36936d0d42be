//! Line item domain types.

use std::collections::BTreeMap;
use std::fmt;

use procura_shared::types::{ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical identity of a variant built from its attributes.
///
/// Attributes are sorted by key (then value) and joined as `key=value`
/// pairs separated by `;`, so two attribute maps with the same content
/// always produce the same key regardless of iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    /// Builds the canonical key from attribute pairs.
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs: Vec<(String, String)> = attributes
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_string(), v.as_ref().trim().to_string()))
            .collect();
        pairs.sort();

        let joined = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";");
        Self(joined)
    }

    /// The canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for a variant without attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product or variant record as supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Product identifier.
    pub product_id: ProductId,
    /// Variant identifier, if the product has variants.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Unit family name (`weight`, `volume`, `piece`, `length`).
    pub unit_type: String,
    /// Preferred purchase unit.
    #[serde(default)]
    pub default_unit: Option<String>,
    /// Cost per default unit.
    pub unit_cost: Decimal,
    /// Catalog selling price, if set.
    #[serde(default)]
    pub selling_price: Option<Decimal>,
    /// Variant attributes (e.g. `color: red`).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl CatalogItem {
    /// Canonical variant key for this record.
    #[must_use]
    pub fn variant_key(&self) -> VariantKey {
        VariantKey::from_attributes(&self.attributes)
    }
}

/// One product/variant entry within a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier.
    pub product_id: ProductId,
    /// Variant identifier.
    pub variant_id: Option<VariantId>,
    /// Canonical attribute key.
    pub variant_key: VariantKey,
    /// Resolved unit family.
    pub unit_family: String,
    /// Family the catalog asked for when the `piece` fallback was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<String>,
    /// Unit the goods are purchased in.
    pub purchase_unit: String,
    /// Quantity in the purchase unit.
    pub purchase_quantity: Decimal,
    /// Cost per purchase unit.
    pub unit_price: Decimal,
    /// Unit the goods will be sold in.
    pub sale_unit: String,
    /// Selling price per sale unit.
    pub sale_price: Decimal,
    /// Per-line transportation surcharge.
    pub transportation_cost: Decimal,
    /// `round(purchase_quantity * unit_price, 2)`.
    pub total_price: Decimal,
}

impl LineItem {
    /// Returns true if this line is the same product, variant and attribute key.
    #[must_use]
    pub fn same_identity(
        &self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        variant_key: &VariantKey,
    ) -> bool {
        self.product_id == product_id
            && self.variant_id == variant_id
            && &self.variant_key == variant_key
    }
}

/// Editable line item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemField {
    /// Quantity in the purchase unit.
    PurchaseQuantity,
    /// Cost per purchase unit.
    UnitPrice,
    /// Selling price per sale unit.
    SalePrice,
    /// Extended line cost.
    TotalPrice,
    /// Purchase unit.
    PurchaseUnit,
    /// Sale unit.
    SaleUnit,
    /// Per-line transportation surcharge.
    TransportationCost,
}

impl LineItemField {
    /// Returns the snake_case field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PurchaseQuantity => "purchase_quantity",
            Self::UnitPrice => "unit_price",
            Self::SalePrice => "sale_price",
            Self::TotalPrice => "total_price",
            Self::PurchaseUnit => "purchase_unit",
            Self::SaleUnit => "sale_unit",
            Self::TransportationCost => "transportation_cost",
        }
    }
}

impl fmt::Display for LineItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field edit on a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LineItemUpdate {
    /// New purchase quantity.
    PurchaseQuantity(Decimal),
    /// New cost per purchase unit.
    UnitPrice(Decimal),
    /// New selling price.
    SalePrice(Decimal),
    /// New per-line transportation surcharge.
    TransportationCost(Decimal),
    /// New purchase unit; the sale unit is re-validated.
    PurchaseUnit(String),
    /// New sale unit; must not be larger than the purchase unit.
    SaleUnit(String),
}

impl LineItemUpdate {
    /// The field this update targets.
    #[must_use]
    pub fn field(&self) -> LineItemField {
        match self {
            Self::PurchaseQuantity(_) => LineItemField::PurchaseQuantity,
            Self::UnitPrice(_) => LineItemField::UnitPrice,
            Self::SalePrice(_) => LineItemField::SalePrice,
            Self::TransportationCost(_) => LineItemField::TransportationCost,
            Self::PurchaseUnit(_) => LineItemField::PurchaseUnit,
            Self::SaleUnit(_) => LineItemField::SaleUnit,
        }
    }
}
