//! Stockroom Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging and error handling for the Stockroom workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`StockroomError`] and the crate [`Result`] alias
//! - **Logging**: tracing subscriber setup shared by every binary
//! - **Types**: identifiers and enums that cross the API boundary
//!   ([`types::ChildKey`], [`types::Visibility`], [`types::SortDirection`])
//!
//! # Example
//!
//! ```
//! use stockroom_common::types::ChildKey;
//!
//! let key: ChildKey = "5,2".parse().unwrap();
//! assert_eq!(key.item_id, 5);
//! assert_eq!(key.child_id, 2);
//! assert_eq!(key.to_string(), "5,2");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, StockroomError};
