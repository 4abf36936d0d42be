//! Installment schedule generation.
//!
//! Each installment is `floor(total / count * 100) / 100`; the last one
//! absorbs the remainder so the schedule sums to the total exactly.

use chrono::{Months, NaiveDate};
use procura_shared::types::floor_money;
use rust_decimal::Decimal;

use super::types::{Installment, InstallmentPlan};

/// Stateless installment schedule builder.
pub struct InstallmentSchedule;

impl InstallmentSchedule {
    /// Splits `grand_total` into `plan.count` installments.
    ///
    /// Returns an empty schedule for an invalid plan.
    #[must_use]
    pub fn generate(grand_total: Decimal, plan: InstallmentPlan) -> Vec<Installment> {
        if !plan.is_valid() {
            return vec![];
        }
        let amounts = Self::split(grand_total, plan.count);
        Self::build(&amounts, plan)
    }

    /// Like [`Self::generate`], but with a hand-entered first installment.
    ///
    /// The rest of the total is split across the remaining installments.
    /// A single-installment plan yields just `first_amount`.
    #[must_use]
    pub fn generate_with_first(
        grand_total: Decimal,
        plan: InstallmentPlan,
        first_amount: Decimal,
    ) -> Vec<Installment> {
        if !plan.is_valid() {
            return vec![];
        }
        let mut amounts = vec![first_amount];
        amounts.extend(Self::split(
            grand_total.saturating_sub(first_amount),
            plan.count - 1,
        ));
        Self::build(&amounts, plan)
    }

    /// First installment of the standard split.
    #[must_use]
    pub fn first_installment(grand_total: Decimal, plan: InstallmentPlan) -> Decimal {
        Self::generate(grand_total, plan)
            .first()
            .map_or(Decimal::ZERO, |installment| installment.amount)
    }

    /// Assigns calendar due dates counted from `start`.
    ///
    /// Dates that would overflow the calendar are left unset.
    #[must_use]
    pub fn with_due_dates(schedule: &[Installment], start: NaiveDate) -> Vec<Installment> {
        schedule
            .iter()
            .map(|installment| Installment {
                due_date: start.checked_add_months(Months::new(installment.due_month_offset)),
                ..*installment
            })
            .collect()
    }

    /// Sum of all scheduled amounts, or `None` if it overflows.
    #[must_use]
    pub fn total(schedule: &[Installment]) -> Option<Decimal> {
        schedule
            .iter()
            .try_fold(Decimal::ZERO, |sum, installment| sum.checked_add(installment.amount))
    }

    fn split(total: Decimal, count: u32) -> Vec<Decimal> {
        if count == 0 {
            return vec![];
        }
        let base = floor_money(total / Decimal::from(count));
        // count is bounded by InstallmentPlan::MAX_COUNT
        let mut amounts = vec![base; count as usize];
        let allocated = base * Decimal::from(count - 1);
        if let Some(last) = amounts.last_mut() {
            *last = total - allocated;
        }
        amounts
    }

    fn build(amounts: &[Decimal], plan: InstallmentPlan) -> Vec<Installment> {
        amounts
            .iter()
            .zip(0u32..)
            .map(|(amount, index)| Installment {
                sequence: index + 1,
                amount: *amount,
                due_month_offset: Self::due_month_offset(index, plan),
                due_date: None,
            })
            .collect()
    }

    fn due_month_offset(index: u32, plan: InstallmentPlan) -> u32 {
        let offset = u64::from(index) * u64::from(plan.duration_months) / u64::from(plan.count);
        u32::try_from(offset).unwrap_or(u32::MAX)
    }
}
