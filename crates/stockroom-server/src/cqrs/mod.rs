//! Command and query dispatch
//!
//! Feature handlers are plain async functions. The API layer runs them
//! through [`send_command`] or [`send_query`], which wrap each call in a
//! tracing span named after the request type and log its outcome.

pub mod middleware;

pub use middleware::{send_command, send_query, Command, Query};
