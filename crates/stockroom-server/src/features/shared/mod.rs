//! Shared utilities and types for feature modules
//!
//! # Contents
//!
//! - **batch**: sequential batch application with first-failure short-circuit
//! - **failure**: classification of handler errors into client-facing outcomes
//! - **validation**: input validation utilities
//! - **test_helpers**: fixtures for handler tests (test-only)

pub mod batch;
pub mod failure;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use batch::BatchError;
pub use failure::{Failure, FailureKind};
pub use validation::{
    validate_amount, validate_name, AmountValidationError, NameValidationError, MAX_NAME_LENGTH,
};
