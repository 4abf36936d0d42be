//! Payment status state machine.
//!
//! Transition methods take the current [`PaymentState`] and return the
//! next one. [`PaymentReconciler::reconcile`] then derives the paid amount
//! as a pure function of `(status, driver)`:
//!
//! | driver           | status        | paid amount                              |
//! |------------------|---------------|------------------------------------------|
//! | `Status`         | `unpaid`      | 0, account cleared                       |
//! | `Status`         | `paid`        | grand total                              |
//! | `Status`         | `partial`     | `floor(grand_total * seed_ratio)`        |
//! | `Status`         | `installment` | first installment of the standard split  |
//! | `ManualOverride` | any           | hand-entered amount                      |
//! | `Advance`        | any           | requested or `min(advance, grand_total)` |
//!
//! Under `ManualOverride` and `Advance` the effective status follows the
//! amount (`installment` stays `installment` under override). A `paid` or
//! `partial` status with nothing paid, as on an empty draft, reports `unpaid`.

use procura_shared::types::{PaymentAccountId, floor_money, non_negative};
use rust_decimal::Decimal;

use super::schedule::InstallmentSchedule;
use super::types::{InstallmentPlan, PaymentDriver, PaymentSnapshot, PaymentState, PaymentStatus};
use crate::advance::AdvanceCreditLedger;

/// Derives payment snapshots and applies payment transitions.
#[derive(Debug, Clone, Copy)]
pub struct PaymentReconciler {
    partial_seed_ratio: Decimal,
}

impl Default for PaymentReconciler {
    fn default() -> Self {
        Self::new(Decimal::new(5, 1))
    }
}

impl PaymentReconciler {
    /// Creates a reconciler; `partial_seed_ratio` seeds `partial` payments.
    #[must_use]
    pub fn new(partial_seed_ratio: Decimal) -> Self {
        Self { partial_seed_ratio }
    }

    /// Explicit status selection.
    ///
    /// Disengages advance adjustment. Without override the amount is
    /// re-derived from the status; selecting `partial` seeds the amount and
    /// engages override so the caller can edit it. `unpaid` clears the account.
    #[must_use]
    pub fn select_status(
        &self,
        state: &PaymentState,
        status: PaymentStatus,
        grand_total: Decimal,
    ) -> PaymentState {
        let mut next = state.clone();
        next.status = status;
        next.advance_request = None;

        match (state.driver, status) {
            (PaymentDriver::ManualOverride, _) => {}
            (_, PaymentStatus::Partial) => {
                next.driver = PaymentDriver::ManualOverride;
                next.manual_amount = self.partial_seed(grand_total);
            }
            (_, PaymentStatus::Unpaid) => {
                next.driver = PaymentDriver::Status;
                next.payment_account_id = None;
            }
            _ => next.driver = PaymentDriver::Status,
        }
        next
    }

    /// Engages or releases manual override.
    ///
    /// Engaging freezes the currently derived amount as the manual amount
    /// and disengages advance adjustment. Releasing returns to the status formula.
    #[must_use]
    pub fn set_manual_override(
        &self,
        state: &PaymentState,
        engaged: bool,
        grand_total: Decimal,
        advance_balance: Decimal,
    ) -> PaymentState {
        let mut next = state.clone();
        if engaged {
            if state.driver != PaymentDriver::ManualOverride {
                next.manual_amount = self
                    .reconcile(state, grand_total, advance_balance)
                    .paid_amount;
            }
            next.driver = PaymentDriver::ManualOverride;
            next.advance_request = None;
        } else if state.driver == PaymentDriver::ManualOverride {
            next.driver = PaymentDriver::Status;
        }
        next
    }

    /// Enables or disables advance adjustment.
    ///
    /// Enabling disengages manual override.
    #[must_use]
    pub fn toggle_advance(&self, state: &PaymentState, enabled: bool) -> PaymentState {
        let mut next = state.clone();
        next.advance_request = None;
        if enabled {
            next.driver = PaymentDriver::Advance;
        } else if state.driver == PaymentDriver::Advance {
            next.driver = PaymentDriver::Status;
        }
        next
    }

    /// Hand-enters the paid amount, engaging manual override.
    #[must_use]
    pub fn set_paid_amount(&self, state: &PaymentState, amount: Decimal) -> PaymentState {
        let mut next = state.clone();
        next.driver = PaymentDriver::ManualOverride;
        next.manual_amount = amount;
        next.advance_request = None;
        next
    }

    /// Requests a specific amount of advance credit, engaging advance adjustment.
    ///
    /// The request is kept as entered; amounts above what may be applied
    /// are reported by validation rather than clamped.
    #[must_use]
    pub fn set_advance_amount(&self, state: &PaymentState, amount: Decimal) -> PaymentState {
        let mut next = state.clone();
        next.driver = PaymentDriver::Advance;
        next.advance_request = Some(amount);
        next
    }

    /// Sets the installment plan.
    #[must_use]
    pub fn set_installment_plan(&self, state: &PaymentState, plan: InstallmentPlan) -> PaymentState {
        PaymentState {
            installment_plan: Some(plan),
            ..state.clone()
        }
    }

    /// Sets or clears the payment account.
    #[must_use]
    pub fn set_payment_account(
        &self,
        state: &PaymentState,
        account: Option<PaymentAccountId>,
    ) -> PaymentState {
        PaymentState {
            payment_account_id: account,
            ..state.clone()
        }
    }

    /// Derives the payment snapshot for `grand_total`.
    #[must_use]
    pub fn reconcile(
        &self,
        state: &PaymentState,
        grand_total: Decimal,
        advance_balance: Decimal,
    ) -> PaymentSnapshot {
        let (status, paid_amount, advance_applied) = match state.driver {
            PaymentDriver::Advance => {
                let applied = state.advance_request.unwrap_or_else(|| {
                    AdvanceCreditLedger::max_applicable(advance_balance, grand_total)
                });
                (
                    PaymentStatus::from_amounts(applied, grand_total),
                    applied,
                    applied,
                )
            }
            PaymentDriver::ManualOverride => {
                let status = match state.status {
                    PaymentStatus::Installment => PaymentStatus::Installment,
                    _ => PaymentStatus::from_amounts(state.manual_amount, grand_total),
                };
                (status, state.manual_amount, Decimal::ZERO)
            }
            PaymentDriver::Status => (
                state.status,
                self.status_default(state, grand_total),
                Decimal::ZERO,
            ),
        };

        let status = match status {
            PaymentStatus::Paid | PaymentStatus::Partial if paid_amount.is_zero() => {
                PaymentStatus::Unpaid
            }
            other => other,
        };

        let installment_plan = match status {
            PaymentStatus::Installment => state.installment_plan,
            _ => None,
        };
        let schedule = match installment_plan {
            Some(plan) if state.driver == PaymentDriver::ManualOverride => {
                InstallmentSchedule::generate_with_first(grand_total, plan, paid_amount)
            }
            Some(plan) => InstallmentSchedule::generate(grand_total, plan),
            None => vec![],
        };
        let payment_account_id = match status {
            PaymentStatus::Unpaid => None,
            _ => state.payment_account_id,
        };

        PaymentSnapshot {
            status,
            paid_amount,
            due_amount: non_negative(grand_total.saturating_sub(paid_amount)),
            advance_applied,
            cash_paid: paid_amount.saturating_sub(advance_applied),
            payment_account_id,
            installment_plan,
            schedule,
        }
    }

    fn status_default(&self, state: &PaymentState, grand_total: Decimal) -> Decimal {
        match state.status {
            PaymentStatus::Unpaid => Decimal::ZERO,
            PaymentStatus::Paid => grand_total,
            PaymentStatus::Partial => self.partial_seed(grand_total),
            PaymentStatus::Installment => state
                .installment_plan
                .map_or(Decimal::ZERO, |plan| {
                    InstallmentSchedule::first_installment(grand_total, plan)
                }),
        }
    }

    fn partial_seed(&self, grand_total: Decimal) -> Decimal {
        floor_money(grand_total.saturating_mul(self.partial_seed_ratio))
    }
}
