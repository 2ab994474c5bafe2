//! Stockroom Server Library
//!
//! GraphQL backend for tracking physical inventory: items, their numbered
//! sub-units ("children"), and the people, courses and rooms they belong to.
//!
//! # Overview
//!
//! - **History ledger**: every change to an item or child appends a new
//!   history row; the current state is the newest row per key
//! - **Soft deletion**: removal stamps `deleted_at` and can be undone
//! - **GraphQL API**: `async-graphql` served through Axum at `/graphql`
//! - **Storage**: PostgreSQL through SQLx, or an in-memory store for
//!   development and tests
//! - **Seal images**: uploaded inventory-sticker photos kept on the local
//!   filesystem
//!
//! # Architecture
//!
//! Requests follow a **CQRS** split:
//!
//! - **Commands** append to the ledger (add, edit, remove, restore). Each
//!   has its own error enum; errors are classified as structured failures
//!   reported to the client or as faults.
//! - **Queries** only read (listings, single records, histories, CSV).
//!
//! Both live in vertical slices under [`features`] and are dispatched by the
//! GraphQL resolvers through [`cqrs::middleware`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stockroom_server::{api, config::Config, features::FeatureState, storage::SealStorage,
//!     store::MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let state = FeatureState::new(
//!         Arc::new(MemoryStore::new()),
//!         SealStorage::from_config(&config.seal),
//!     );
//!     api::serve(&config, state, std::future::pending()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use error::AppError;
