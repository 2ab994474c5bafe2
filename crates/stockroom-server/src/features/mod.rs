//! Feature slices of the inventory ledger
//!
//! Each feature is a vertical slice with its own commands and queries.
//! Handlers are standalone async functions taking the shared
//! [`FeatureState`] and one request value.
//!
//! # Features
//!
//! - **lookups**: admin, course and room identities (resolve and list)
//! - **items**: item identity rows and their append-only histories
//! - **children**: numbered sub-units of items keyed by `"<itemId>,<childId>"`
//! - **export**: CSV export of the current state
//!
//! Commands and queries implement the mediator `Request` trait and the
//! marker traits in [`crate::cqrs::middleware`].

pub mod children;
pub mod export;
pub mod items;
pub mod lookups;
pub mod shared;

use crate::storage::SealStorage;
use crate::store::DynStore;

/// Shared state for all feature handlers
#[derive(Clone)]
pub struct FeatureState {
    /// Backing store of the ledger
    pub store: DynStore,
    /// Filesystem storage for seal images
    pub seals: SealStorage,
}

impl FeatureState {
    pub fn new(store: DynStore, seals: SealStorage) -> Self {
        Self { store, seals }
    }
}
