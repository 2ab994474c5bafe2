//! Admin, course and room identities
//!
//! Identities are created lazily the first time a name or room number is
//! used and never change afterwards.

pub mod queries;
pub mod resolve;

pub use resolve::{resolve, Identity};
