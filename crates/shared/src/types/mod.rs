//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{AMOUNT_LIMIT, MONEY_DP, floor_money, non_negative, round_money, within_amount_limit};
