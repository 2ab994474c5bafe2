//! Shared validation utilities

use thiserror::Error;

/// Longest accepted name or code
pub const MAX_NAME_LENGTH: usize = 256;

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be between 1 and {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Amount must be at least 1, got {0}")]
pub struct AmountValidationError(pub i32);

/// Validate a required text field
///
/// # Rules
/// - Must not be empty (after trimming whitespace)
/// - Must not exceed max_length characters
pub fn validate_name(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), NameValidationError> {
    if value.trim().is_empty() {
        return Err(NameValidationError::Required { field });
    }

    if value.chars().count() > max_length {
        return Err(NameValidationError::TooLong { field, max_length });
    }

    Ok(())
}

pub fn validate_amount(amount: i32) -> Result<(), AmountValidationError> {
    if amount < 1 {
        return Err(AmountValidationError(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Desk", "name", 256).is_ok());
        assert!(validate_name("A", "code", 1).is_ok());
    }

    #[test]
    fn test_validate_name_empty() {
        assert_eq!(
            validate_name("   ", "name", 256),
            Err(NameValidationError::Required { field: "name" })
        );
    }

    #[test]
    fn test_validate_name_too_long() {
        let long = "x".repeat(11);
        assert!(matches!(
            validate_name(&long, "code", 10),
            Err(NameValidationError::TooLong { max_length: 10, .. })
        ));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert_eq!(validate_amount(0), Err(AmountValidationError(0)));
        assert!(validate_amount(-4).is_err());
    }
}
