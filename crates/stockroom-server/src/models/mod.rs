//! Domain records of the inventory ledger
//!
//! Row types mirror the tables in `migrations/`. Snapshot types are the
//! joined "current state" projections the ledger hands to callers: an item
//! identity row merged with its newest history row, or the newest history
//! row of one child unit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stockroom_common::types::{ChildKey, SortDirection, Visibility};

/// Surrogate key of an item identity row
pub type ItemId = i32;

/// Administrator responsible for an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: i32,
    pub number: i32,
}

/// Immutable identity of a tracked item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: ItemId,
    pub code: String,
    pub name: String,
    pub amount: i32,
    pub admin_id: i32,
    pub course_id: i32,
    pub purchased_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Values for a new item identity row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub code: String,
    pub name: String,
    pub amount: i32,
    pub admin_id: i32,
    pub course_id: i32,
    pub purchased_at: NaiveDate,
    /// Backdated creation time; the store's clock is used when absent
    pub created_at: Option<DateTime<Utc>>,
}

/// One version of an item's mutable facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemHistory {
    pub id: i32,
    pub item_id: ItemId,
    pub room_id: i32,
    /// Room number resolved through `room_id`
    pub room: i32,
    /// File extension of the stored seal image, e.g. `.png`
    pub seal: Option<String>,
    pub checked_at: Option<NaiveDate>,
    pub disposal_at: Option<NaiveDate>,
    pub depreciation_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new item history row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemHistory {
    pub item_id: ItemId,
    pub room_id: i32,
    pub seal: Option<String>,
    pub checked_at: Option<NaiveDate>,
    pub disposal_at: Option<NaiveDate>,
    pub depreciation_at: Option<NaiveDate>,
}

impl NewItemHistory {
    /// A new version that starts as an exact copy of `current`
    pub fn carry_forward(current: &ItemHistory) -> Self {
        Self {
            item_id: current.item_id,
            room_id: current.room_id,
            seal: current.seal.clone(),
            checked_at: current.checked_at,
            disposal_at: current.disposal_at,
            depreciation_at: current.depreciation_at,
        }
    }
}

/// Current state of an item: identity joined with its newest history row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub code: String,
    pub name: String,
    pub amount: i32,
    pub admin_id: i32,
    pub admin: String,
    pub course_id: i32,
    pub course: String,
    pub purchased_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Id of the history row this snapshot was built from
    pub history_id: i32,
    pub room_id: i32,
    pub room: i32,
    pub seal: Option<String>,
    pub checked_at: Option<NaiveDate>,
    pub disposal_at: Option<NaiveDate>,
    pub depreciation_at: Option<NaiveDate>,
    /// Creation time of the newest history row
    pub updated_at: DateTime<Utc>,
}

impl ItemSnapshot {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// One version of a child unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChildHistory {
    pub id: i32,
    pub item_id: ItemId,
    pub child_id: i32,
    pub name: Option<String>,
    pub room_id: Option<i32>,
    pub room: Option<i32>,
    pub checked_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ChildHistory {
    pub fn key(&self) -> ChildKey {
        ChildKey::new(self.item_id, self.child_id)
    }
}

/// Values for a new child history row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChildHistory {
    pub key: ChildKey,
    pub name: Option<String>,
    pub room_id: Option<i32>,
    pub checked_at: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Current state of a child unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChildSnapshot {
    pub history_id: i32,
    pub item_id: ItemId,
    pub child_id: i32,
    /// The child's own name override
    pub name: Option<String>,
    pub item_name: String,
    pub code: String,
    pub room_id: Option<i32>,
    pub room: Option<i32>,
    pub checked_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub item_deleted_at: Option<DateTime<Utc>>,
}

impl ChildSnapshot {
    pub fn key(&self) -> ChildKey {
        ChildKey::new(self.item_id, self.child_id)
    }

    /// Name shown for the child: its override, else the parent item's name
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.item_name)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Columns an item listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortColumn {
    Id,
    Amount,
    PurchasedAt,
    CheckedAt,
    DisposalAt,
    DepreciationAt,
}

impl SortColumn {
    /// Look up a column by its API field name; `None` for anything off the whitelist
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "id" => Some(SortColumn::Id),
            "amount" => Some(SortColumn::Amount),
            "purchasedAt" => Some(SortColumn::PurchasedAt),
            "checkedAt" => Some(SortColumn::CheckedAt),
            "disposalAt" => Some(SortColumn::DisposalAt),
            "depreciationAt" => Some(SortColumn::DepreciationAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: SortColumn,
    pub direction: SortDirection,
}

/// Filter, search and ordering for an item listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub sort: Vec<SortKey>,
    pub visibility: Visibility,
}

/// Filter and search for a child listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildFilter {
    /// Restrict the listing to the children of one item
    pub item_id: Option<ItemId>,
    pub search: Option<String>,
    pub visibility: Visibility,
}

/// Search text as given, `None` when it is empty
///
/// Whitespace is part of the term: `" Desk"` only matches names with a space
/// before `Desk`.
pub fn normalize_search(search: Option<&str>) -> Option<String> {
    search.filter(|s| !s.is_empty()).map(str::to_string)
}
