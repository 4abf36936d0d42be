//! Money rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` and are rounded to 2 decimal
//! places only at document boundaries.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for monetary amounts.
pub const MONEY_DP: u32 = 2;

/// Largest magnitude, in whole units, accepted for an entered amount or quantity.
///
/// Products and sums of accepted values stay far inside `Decimal`'s range.
pub const AMOUNT_LIMIT: i64 = 1_000_000_000_000_000;

/// Rounds an amount to 2 decimal places, midpoint away from zero.
///
/// `round_money(2.345) == 2.35`, `round_money(-2.345) == -2.35`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates an amount toward negative infinity at 2 decimal places.
///
/// This is `floor(amount * 100) / 100`.
#[must_use]
pub fn floor_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::ToNegativeInfinity)
}

/// Clamps an amount at zero from below.
#[must_use]
pub fn non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Returns true if `|amount| <= AMOUNT_LIMIT`.
#[must_use]
pub fn within_amount_limit(amount: Decimal) -> bool {
    amount.abs() <= Decimal::from(AMOUNT_LIMIT)
}
