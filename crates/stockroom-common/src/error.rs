//! Error types for Stockroom

use thiserror::Error;

/// Result type alias for Stockroom operations
pub type Result<T> = std::result::Result<T, StockroomError>;

/// Main error type for Stockroom shared types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockroomError {
    #[error("Malformed child id '{0}': expected '<itemId>,<childId>' with positive integers")]
    MalformedId(String),

    #[error("Unknown visibility '{0}': expected NORMAL, ALL or ONLY_DELETED")]
    InvalidVisibility(String),
}
