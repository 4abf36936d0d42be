//! Purchase scenario files.
//!
//! A scenario bundles the reference data a purchase is reconciled against
//! with the edit events that build it.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use procura_core::advance::SupplierAccount;
use procura_core::purchase::PurchaseEvent;
use procura_core::units::{UnitFamily, UnitRegistry};
use procura_shared::types::{PaymentAccountId, PurchaseId, SupplierId};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Supplier balances as the supplier directory reports them.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierRecord {
    pub supplier_id: SupplierId,
    #[serde(default)]
    pub advance: Decimal,
    #[serde(default)]
    pub due: Decimal,
}

impl SupplierRecord {
    pub fn account(&self) -> SupplierAccount {
        SupplierAccount::from_advance_due(self.supplier_id, self.advance, self.due)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub purchase_id: PurchaseId,
    pub supplier: Option<SupplierRecord>,
    #[serde(default)]
    pub accounts: HashMap<PaymentAccountId, Decimal>,
    /// Families registered on top of the standard ones.
    #[serde(default)]
    pub unit_families: Vec<UnitFamily>,
    pub events: Vec<PurchaseEvent>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn registry(&self) -> UnitRegistry {
        let mut registry = UnitRegistry::standard();
        for family in &self.unit_families {
            registry.register(family.clone());
        }
        registry
    }
}
