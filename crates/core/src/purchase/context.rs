//! Reference data shared by every reducer step.

use procura_shared::EngineConfig;
use procura_shared::types::SupplierId;
use rust_decimal::Decimal;

use crate::advance::SupplierAccount;
use crate::line_item::LineItemCalculator;
use crate::payment::PaymentReconciler;
use crate::units::{UnitConversionResolver, UnitRegistry};

/// Read-only collaborators a draft is reconciled against.
#[derive(Debug, Clone, Copy)]
pub struct EngineContext<'a> {
    /// Registered unit families.
    pub units: &'a UnitRegistry,
    /// Engine tunables.
    pub config: &'a EngineConfig,
    /// Balances of the supplier being purchased from, if loaded.
    pub supplier: Option<&'a SupplierAccount>,
}

impl<'a> EngineContext<'a> {
    /// Creates a context with no supplier balances loaded.
    #[must_use]
    pub fn new(units: &'a UnitRegistry, config: &'a EngineConfig) -> Self {
        Self {
            units,
            config,
            supplier: None,
        }
    }

    /// Attaches the supplier's balances.
    #[must_use]
    pub fn with_supplier(mut self, supplier: &'a SupplierAccount) -> Self {
        self.supplier = Some(supplier);
        self
    }

    /// Unit resolver honouring the configured fallback policy.
    #[must_use]
    pub fn resolver(&self) -> UnitConversionResolver<'a> {
        UnitConversionResolver::new(self.units).with_fallback(self.config.allow_unit_family_fallback)
    }

    /// Line item calculator using the configured markup.
    #[must_use]
    pub fn calculator(&self) -> LineItemCalculator<'a> {
        LineItemCalculator::new(self.resolver(), self.config.default_markup)
    }

    /// Payment reconciler using the configured partial seed.
    #[must_use]
    pub fn reconciler(&self) -> PaymentReconciler {
        PaymentReconciler::new(self.config.partial_seed_ratio)
    }

    /// Stored advance balance for `supplier_id`.
    ///
    /// Zero when no supplier is chosen or the loaded balances belong to
    /// another supplier.
    #[must_use]
    pub fn advance_balance(&self, supplier_id: Option<SupplierId>) -> Decimal {
        match (self.supplier, supplier_id) {
            (Some(account), Some(id)) if account.supplier_id == id => account.advance_balance,
            _ => Decimal::ZERO,
        }
    }
}
