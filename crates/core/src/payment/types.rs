//! Payment domain types.
//!
//! `PaymentState` holds what the caller chose; `PaymentSnapshot` is what
//! the reconciler derives from it. Only the state is ever stored on a draft.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use procura_shared::types::PaymentAccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PaymentError;

/// Payment status of a purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing paid.
    #[default]
    Unpaid,
    /// Part of the grand total paid.
    Partial,
    /// Grand total paid in full.
    Paid,
    /// Paid over a schedule of installments.
    Installment,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Installment => "installment",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(Self::Unpaid),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            "installment" => Some(Self::Installment),
            _ => None,
        }
    }

    /// Status implied by an amount paid against a grand total.
    ///
    /// `paid` when the total is covered, `partial` for any positive
    /// amount below it, `unpaid` otherwise.
    #[must_use]
    pub fn from_amounts(paid_amount: Decimal, grand_total: Decimal) -> Self {
        if paid_amount > Decimal::ZERO && paid_amount >= grand_total {
            Self::Paid
        } else if paid_amount > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Unpaid
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| PaymentError::UnknownStatus(s.to_string()))
    }
}

/// Number of installments and the months they span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// Number of installments.
    pub count: u32,
    /// Months covered by the plan.
    pub duration_months: u32,
}

impl InstallmentPlan {
    /// Most installments a plan may have (fifty years of monthly payments).
    pub const MAX_COUNT: u32 = 600;

    /// Creates a validated plan.
    pub fn new(count: u32, duration_months: u32) -> Result<Self, PaymentError> {
        let plan = Self {
            count,
            duration_months,
        };
        if plan.is_valid() {
            Ok(plan)
        } else {
            Err(PaymentError::InvalidInstallmentPlan {
                count,
                duration_months,
            })
        }
    }

    /// Returns true if count is within `1..=MAX_COUNT` and duration is at least 1.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (1..=Self::MAX_COUNT).contains(&self.count) && self.duration_months >= 1
    }
}

/// One scheduled installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position in the schedule.
    pub sequence: u32,
    /// Amount due.
    pub amount: Decimal,
    /// Whole months after the purchase date.
    pub due_month_offset: u32,
    /// Calendar due date, when a start date is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Which input currently drives the paid amount.
///
/// Exactly one driver is live at a time, which is what makes manual
/// override and advance adjustment mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDriver {
    /// Paid amount follows the selected status.
    #[default]
    Status,
    /// Paid amount is hand-entered.
    ManualOverride,
    /// Paid amount is taken from the supplier's advance credit.
    Advance,
}

/// Caller-controlled payment inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentState {
    /// Status the caller selected.
    pub status: PaymentStatus,
    /// Live driver of the paid amount.
    pub driver: PaymentDriver,
    /// Hand-entered amount, live under `ManualOverride`.
    pub manual_amount: Decimal,
    /// Explicit advance amount, live under `Advance`; `None` applies the maximum.
    pub advance_request: Option<Decimal>,
    /// Account the cash portion is drawn from.
    pub payment_account_id: Option<PaymentAccountId>,
    /// Plan used when the status is `installment`.
    pub installment_plan: Option<InstallmentPlan>,
}

impl PaymentState {
    /// Returns true if manual override is engaged.
    #[must_use]
    pub fn override_engaged(&self) -> bool {
        self.driver == PaymentDriver::ManualOverride
    }

    /// Returns true if advance adjustment is engaged.
    #[must_use]
    pub fn advance_engaged(&self) -> bool {
        self.driver == PaymentDriver::Advance
    }
}

/// Derived payment figures for one grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    /// Effective status.
    pub status: PaymentStatus,
    /// Total paid at creation, including advance credit.
    pub paid_amount: Decimal,
    /// `max(0, grand_total - paid_amount)`.
    pub due_amount: Decimal,
    /// Portion of `paid_amount` covered by advance credit.
    pub advance_applied: Decimal,
    /// Portion of `paid_amount` drawn from the payment account.
    pub cash_paid: Decimal,
    /// Account the cash portion is drawn from.
    pub payment_account_id: Option<PaymentAccountId>,
    /// Plan, when the status is `installment`.
    pub installment_plan: Option<InstallmentPlan>,
    /// Installments, when the status is `installment` and the plan is valid.
    pub schedule: Vec<Installment>,
}
