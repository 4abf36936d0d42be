//! Property-based tests for payment reconciliation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconciler::PaymentReconciler;
use super::schedule::InstallmentSchedule;
use super::types::{InstallmentPlan, PaymentState, PaymentStatus};

/// Amounts from 0.00 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Balances from -10,000.00 to 1,000,000.00.
fn balance() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Unpaid),
        Just(PaymentStatus::Partial),
        Just(PaymentStatus::Paid),
        Just(PaymentStatus::Installment),
    ]
}

fn plan() -> impl Strategy<Value = InstallmentPlan> {
    (1u32..=24, 1u32..=36).prop_map(|(count, duration_months)| InstallmentPlan {
        count,
        duration_months,
    })
}

fn status_driven(status: PaymentStatus, plan: InstallmentPlan, grand_total: Decimal) -> PaymentState {
    let r = PaymentReconciler::default();
    let state = r.set_installment_plan(&PaymentState::default(), plan);
    r.select_status(&state, status, grand_total)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Without a hand-entered amount the paid amount never exceeds the total.
    #[test]
    fn prop_paid_within_total(
        status in status(),
        plan in plan(),
        grand_total in amount(),
        advance in balance(),
        use_advance in any::<bool>(),
    ) {
        let r = PaymentReconciler::default();
        let mut state = status_driven(status, plan, grand_total);
        if use_advance {
            state = r.toggle_advance(&state, true);
        }
        let snapshot = r.reconcile(&state, grand_total, advance);

        prop_assert!(snapshot.paid_amount >= Decimal::ZERO);
        prop_assert!(snapshot.paid_amount <= grand_total);
    }

    /// Due amount is never negative and closes the gap to the total.
    #[test]
    fn prop_due_amount(
        status in status(),
        plan in plan(),
        grand_total in amount(),
        manual in proptest::option::of(amount()),
    ) {
        let r = PaymentReconciler::default();
        let mut state = status_driven(status, plan, grand_total);
        if let Some(paid) = manual {
            state = r.set_paid_amount(&state, paid);
        }
        let snapshot = r.reconcile(&state, grand_total, Decimal::ZERO);

        prop_assert!(snapshot.due_amount >= Decimal::ZERO);
        prop_assert_eq!(
            snapshot.due_amount,
            (grand_total - snapshot.paid_amount).max(Decimal::ZERO)
        );
    }

    /// `paid` implies the full total and `unpaid` implies nothing paid.
    #[test]
    fn prop_status_matches_amount(
        status in status(),
        plan in plan(),
        grand_total in amount(),
        advance in balance(),
        use_advance in any::<bool>(),
    ) {
        let r = PaymentReconciler::default();
        let mut state = status_driven(status, plan, grand_total);
        if use_advance {
            state = r.toggle_advance(&state, true);
        }
        let snapshot = r.reconcile(&state, grand_total, advance);

        match snapshot.status {
            PaymentStatus::Paid => prop_assert_eq!(snapshot.paid_amount, grand_total),
            PaymentStatus::Unpaid => {
                prop_assert_eq!(snapshot.paid_amount, Decimal::ZERO);
                prop_assert!(snapshot.payment_account_id.is_none());
            }
            PaymentStatus::Partial => {
                prop_assert!(snapshot.paid_amount > Decimal::ZERO);
                prop_assert!(snapshot.paid_amount < grand_total);
            }
            PaymentStatus::Installment => {}
        }
    }

    /// Advance applied stays within `min(max(0, balance), total)`.
    #[test]
    fn prop_advance_within_limit(grand_total in amount(), advance in balance()) {
        let r = PaymentReconciler::default();
        let state = r.toggle_advance(&PaymentState::default(), true);
        let snapshot = r.reconcile(&state, grand_total, advance);

        prop_assert!(snapshot.advance_applied >= Decimal::ZERO);
        prop_assert!(snapshot.advance_applied <= advance.max(Decimal::ZERO));
        prop_assert!(snapshot.advance_applied <= grand_total);
        prop_assert_eq!(snapshot.cash_paid, Decimal::ZERO);
    }

    /// Installment schedules sum to the total and open with the paid amount.
    #[test]
    fn prop_installment_schedule(plan in plan(), grand_total in amount()) {
        let snapshot = PaymentReconciler::default().reconcile(
            &status_driven(PaymentStatus::Installment, plan, grand_total),
            grand_total,
            Decimal::ZERO,
        );

        prop_assert_eq!(snapshot.schedule.len(), plan.count as usize);
        prop_assert_eq!(InstallmentSchedule::total(&snapshot.schedule), Some(grand_total));
        prop_assert_eq!(snapshot.schedule[0].amount, snapshot.paid_amount);
    }

    /// A hand-entered first installment still leaves a schedule summing to the total.
    #[test]
    fn prop_manual_installment_schedule(
        count in 2u32..=24,
        duration_months in 1u32..=36,
        grand_total in amount(),
        share in 0u32..=100,
    ) {
        let plan = InstallmentPlan { count, duration_months };
        let first = (grand_total * Decimal::from(share) / Decimal::ONE_HUNDRED).round_dp(2);
        let r = PaymentReconciler::default();
        let state = r.set_paid_amount(
            &status_driven(PaymentStatus::Installment, plan, grand_total),
            first,
        );
        let snapshot = r.reconcile(&state, grand_total, Decimal::ZERO);

        prop_assert_eq!(snapshot.status, PaymentStatus::Installment);
        prop_assert_eq!(snapshot.schedule[0].amount, first);
        prop_assert_eq!(InstallmentSchedule::total(&snapshot.schedule), Some(grand_total));
    }

    /// Reconciling is a pure function of state.
    #[test]
    fn prop_reconcile_deterministic(
        status in status(),
        plan in plan(),
        grand_total in amount(),
        advance in balance(),
    ) {
        let r = PaymentReconciler::default();
        let state = status_driven(status, plan, grand_total);
        prop_assert_eq!(
            r.reconcile(&state, grand_total, advance),
            r.reconcile(&state.clone(), grand_total, advance)
        );
    }
}
