//! Persistence interface of the inventory ledger
//!
//! [`InventoryStore`] is the seam between the ledger operations in
//! `features/` and a concrete datastore. Two implementations exist:
//!
//! - [`PgStore`]: PostgreSQL through SQLx. Current rows are selected with a
//!   max-id-per-key join over the history tables.
//! - [`MemoryStore`]: an append-only log per table plus an index from each
//!   logical key to its ordered versions, so "current" is the last element.
//!
//! Both enforce the same constraints: item codes are unique across deleted
//! and active rows, and lookup identities are created with an atomic
//! insert-or-get.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use stockroom_common::types::ChildKey;
use thiserror::Error;

use crate::models::{
    ChildFilter, ChildHistory, ChildSnapshot, Course, Item, ItemFilter, ItemHistory, ItemId,
    ItemSnapshot, NewChildHistory, NewItem, NewItemHistory, Room, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A row referenced a parent that does not exist
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle to whichever store the server was configured with
pub type DynStore = Arc<dyn InventoryStore>;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Round-trip to the backend to verify it is reachable
    async fn ping(&self) -> StoreResult<()>;

    // ------------------------------------------------------------------
    // Lookup identities
    // ------------------------------------------------------------------

    /// Id of the user with this name, inserting it if absent
    async fn upsert_user(&self, name: &str) -> StoreResult<i32>;

    /// Id of the course with this name, inserting it if absent
    async fn upsert_course(&self, name: &str) -> StoreResult<i32>;

    /// Id of the room with this number, inserting it if absent
    async fn upsert_room(&self, number: i32) -> StoreResult<i32>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn list_courses(&self) -> StoreResult<Vec<Course>>;

    async fn list_rooms(&self) -> StoreResult<Vec<Room>>;

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Insert an identity row. Fails with [`StoreError::UniqueViolation`] on a taken code.
    async fn insert_item(&self, item: NewItem) -> StoreResult<Item>;

    async fn find_item(&self, id: ItemId, include_deleted: bool) -> StoreResult<Option<Item>>;

    /// Mark every listed active item deleted; returns how many changed
    async fn soft_delete_items(&self, ids: &[ItemId], at: DateTime<Utc>) -> StoreResult<u64>;

    /// Clear the deletion marker of one item; returns whether a row changed
    async fn restore_item(&self, id: ItemId) -> StoreResult<bool>;

    async fn append_item_history(&self, row: NewItemHistory) -> StoreResult<ItemHistory>;

    /// Newest history row of an item
    async fn current_item_history(&self, item_id: ItemId) -> StoreResult<Option<ItemHistory>>;

    /// Every history row of an item, newest first
    async fn item_histories(&self, item_id: ItemId) -> StoreResult<Vec<ItemHistory>>;

    async fn item_snapshot(
        &self,
        id: ItemId,
        include_deleted: bool,
    ) -> StoreResult<Option<ItemSnapshot>>;

    async fn list_item_snapshots(&self, filter: &ItemFilter) -> StoreResult<Vec<ItemSnapshot>>;

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    /// Insert the first history row for children `1..=amount` of an item
    async fn seed_children(
        &self,
        item_id: ItemId,
        amount: i32,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<u64>;

    async fn append_child_history(&self, row: NewChildHistory) -> StoreResult<ChildHistory>;

    /// Newest history row of a child, ignoring the parent item's deletion state
    async fn child_snapshot(
        &self,
        key: ChildKey,
        include_deleted: bool,
    ) -> StoreResult<Option<ChildSnapshot>>;

    /// Every history row of a child, newest first, deleted rows included
    async fn child_histories(&self, key: ChildKey) -> StoreResult<Vec<ChildHistory>>;

    async fn list_child_snapshots(&self, filter: &ChildFilter) -> StoreResult<Vec<ChildSnapshot>>;

    /// Mark every active history row of the listed children deleted
    async fn soft_delete_children(&self, keys: &[ChildKey], at: DateTime<Utc>) -> StoreResult<u64>;

    /// Clear the deletion marker on every history row of a child; returns the row count
    async fn restore_child(&self, key: ChildKey) -> StoreResult<u64>;
}
