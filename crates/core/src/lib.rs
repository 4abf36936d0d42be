//! Purchase reconciliation engine for Procura.
//!
//! This crate contains pure business logic with ZERO storage or web dependencies.
//! It turns selected line items, unit choices, and payment inputs into a
//! consistent, commit-ready purchase snapshot.
//!
//! # Modules
//!
//! - `units` - Unit families and purchase/sale unit resolution
//! - `line_item` - Line item arithmetic and document totals
//! - `advance` - Supplier advance credit
//! - `payment` - Payment status state machine and installment schedules
//! - `validation` - Pre-commit validation
//! - `purchase` - Drafts, edit events, and commit-ready snapshots

pub mod advance;
pub mod line_item;
pub mod payment;
pub mod purchase;
pub mod units;
pub mod validation;
