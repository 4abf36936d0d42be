//! Edit events applied to a purchase draft.

use chrono::NaiveDate;
use procura_shared::types::{PaymentAccountId, SupplierId, WarehouseId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::line_item::{CatalogItem, LineItemUpdate};
use crate::payment::{InstallmentPlan, PaymentStatus};

/// One user action on a purchase draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PurchaseEvent {
    /// Choose the supplier.
    SetSupplier(SupplierId),
    /// Choose the receiving warehouse.
    SetWarehouse(WarehouseId),
    /// Set the purchase date used for installment due dates.
    SetPurchaseDate(NaiveDate),
    /// Add a catalog record, or bump a matching line by one.
    AddItem(CatalogItem),
    /// Remove a line.
    RemoveItem {
        /// Position of the line.
        index: usize,
    },
    /// Edit a line field.
    UpdateItem {
        /// Position of the line.
        index: usize,
        /// Field and new value.
        update: LineItemUpdate,
    },
    /// Change a line's purchase unit.
    SetUnit {
        /// Position of the line.
        index: usize,
        /// New purchase unit.
        unit: String,
    },
    /// Set the shipment-level transportation cost.
    SetTransportationCost(Decimal),
    /// Select a payment status.
    SetPaymentStatus(PaymentStatus),
    /// Set the installment plan.
    SetInstallmentPlan(InstallmentPlan),
    /// Choose or clear the payment account.
    SetPaymentAccount(Option<PaymentAccountId>),
    /// Hand-enter the paid amount.
    SetPaidAmount(Decimal),
    /// Enable or disable paying from advance credit.
    ToggleAdvance(bool),
    /// Request a specific amount of advance credit.
    SetAdvanceAmount(Decimal),
    /// Engage or release manual override.
    SetManualOverride(bool),
}

impl PurchaseEvent {
    /// Returns the snake_case event kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetSupplier(_) => "set_supplier",
            Self::SetWarehouse(_) => "set_warehouse",
            Self::SetPurchaseDate(_) => "set_purchase_date",
            Self::AddItem(_) => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::UpdateItem { .. } => "update_item",
            Self::SetUnit { .. } => "set_unit",
            Self::SetTransportationCost(_) => "set_transportation_cost",
            Self::SetPaymentStatus(_) => "set_payment_status",
            Self::SetInstallmentPlan(_) => "set_installment_plan",
            Self::SetPaymentAccount(_) => "set_payment_account",
            Self::SetPaidAmount(_) => "set_paid_amount",
            Self::ToggleAdvance(_) => "toggle_advance",
            Self::SetAdvanceAmount(_) => "set_advance_amount",
            Self::SetManualOverride(_) => "set_manual_override",
        }
    }
}
