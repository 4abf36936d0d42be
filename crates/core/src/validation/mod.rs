//! Pre-commit validation.

pub mod error;
pub mod validator;

pub use error::{ReferenceField, ValidationError, ValidationErrors};
pub use validator::TransactionValidator;
