//! GraphQL output types
//!
//! Thin wrappers around the ledger's snapshot and history records. Nested
//! fields (`Item.histories`, `Item.children`, `ChildItem.histories`) resolve
//! lazily through the same query handlers as the root fields.

use async_graphql::{ComplexObject, Context, Enum, Object, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use stockroom_common::types::Visibility;

use crate::cqrs::middleware::send_query;
use crate::features::children::queries::{
    histories as child_histories, list as child_list, ChildHistoriesQuery, ListChildrenQuery,
};
use crate::features::items::queries::{histories as item_histories, ItemHistoriesQuery};
use crate::features::shared::FailureKind;
use crate::features::FeatureState;
use crate::models;

/// Which rows a listing includes, by deletion state
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemEnum {
    #[default]
    Normal,
    All,
    OnlyDeleted,
}

impl From<ItemEnum> for Visibility {
    fn from(value: ItemEnum) -> Self {
        match value {
            ItemEnum::Normal => Visibility::Normal,
            ItemEnum::All => Visibility::All,
            ItemEnum::OnlyDeleted => Visibility::OnlyDeleted,
        }
    }
}

/// Which children a listing includes, by the child's own deletion state
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildEnum {
    #[default]
    Normal,
    All,
    OnlyDeleted,
}

impl From<ChildEnum> for Visibility {
    fn from(value: ChildEnum) -> Self {
        match value {
            ChildEnum::Normal => Visibility::Normal,
            ChildEnum::All => Visibility::All,
            ChildEnum::OnlyDeleted => Visibility::OnlyDeleted,
        }
    }
}

/// Machine-readable reason of an unsuccessful mutation
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    DuplicateCode,
    InvalidAttachmentType,
    NoOpEdit,
    NotFound,
    NotDeleted,
    NoChange,
    MalformedId,
    InvalidKey,
    Validation,
}

impl From<FailureKind> for FailureCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::DuplicateCode => FailureCode::DuplicateCode,
            FailureKind::InvalidAttachmentType => FailureCode::InvalidAttachmentType,
            FailureKind::NoOpEdit => FailureCode::NoOpEdit,
            FailureKind::NotFound => FailureCode::NotFound,
            FailureKind::NotDeleted => FailureCode::NotDeleted,
            FailureKind::NoChange => FailureCode::NoChange,
            FailureKind::MalformedId => FailureCode::MalformedId,
            FailureKind::InvalidKey => FailureCode::InvalidKey,
            FailureKind::Validation => FailureCode::Validation,
        }
    }
}

/// Current state of an item
pub struct Item(pub models::ItemSnapshot);

#[Object]
impl Item {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn code(&self) -> &str {
        &self.0.code
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn amount(&self) -> i32 {
        self.0.amount
    }

    /// Administrator name
    async fn admin(&self) -> &str {
        &self.0.admin
    }

    async fn course(&self) -> &str {
        &self.0.course
    }

    /// Room number
    async fn room(&self) -> i32 {
        self.0.room
    }

    /// Extension of the stored seal image, e.g. `.png`
    async fn seal(&self) -> Option<&str> {
        self.0.seal.as_deref()
    }

    async fn purchased_at(&self) -> NaiveDate {
        self.0.purchased_at
    }

    async fn checked_at(&self) -> Option<NaiveDate> {
        self.0.checked_at
    }

    async fn disposal_at(&self) -> Option<NaiveDate> {
        self.0.disposal_at
    }

    async fn depreciation_at(&self) -> Option<NaiveDate> {
        self.0.depreciation_at
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    /// Creation time of the newest history row
    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    async fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.0.deleted_at
    }

    /// Every recorded version, newest first
    async fn histories(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ItemHistory>> {
        let state = ctx.data::<FeatureState>()?;
        let rows = send_query(
            ItemHistoriesQuery { item_id: self.0.id },
            |q| item_histories::handle(state, q),
        )
        .await?;
        Ok(rows.into_iter().map(ItemHistory::from).collect())
    }

    async fn children(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] child_enum: ChildEnum,
    ) -> async_graphql::Result<Vec<ChildItem>> {
        let state = ctx.data::<FeatureState>()?;
        let query = ListChildrenQuery {
            item_id: Some(self.0.id),
            search: None,
            visibility: child_enum.into(),
        };
        let rows = send_query(query, |q| child_list::handle(state, q)).await?;
        Ok(rows.into_iter().map(ChildItem).collect())
    }
}

/// Current state of one numbered unit of an item
pub struct ChildItem(pub models::ChildSnapshot);

#[Object]
impl ChildItem {
    /// Composite id `"<itemId>,<childId>"`
    async fn id(&self) -> String {
        self.0.key().to_string()
    }

    async fn item_id(&self) -> i32 {
        self.0.item_id
    }

    async fn child_id(&self) -> i32 {
        self.0.child_id
    }

    /// The unit's own name, else the item's name
    async fn name(&self) -> &str {
        self.0.display_name()
    }

    /// Code of the parent item
    async fn code(&self) -> &str {
        &self.0.code
    }

    async fn room(&self) -> Option<i32> {
        self.0.room
    }

    async fn checked_at(&self) -> Option<NaiveDate> {
        self.0.checked_at
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.0.deleted_at
    }

    async fn histories(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ChildHistory>> {
        let state = ctx.data::<FeatureState>()?;
        let rows = send_query(
            ChildHistoriesQuery { key: self.0.key() },
            |q| child_histories::handle(state, q),
        )
        .await?;
        Ok(rows.into_iter().map(ChildHistory::from).collect())
    }
}

#[derive(SimpleObject)]
pub struct ItemHistory {
    pub id: i32,
    pub item_id: i32,
    pub room: i32,
    pub seal: Option<String>,
    pub checked_at: Option<NaiveDate>,
    pub disposal_at: Option<NaiveDate>,
    pub depreciation_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<models::ItemHistory> for ItemHistory {
    fn from(row: models::ItemHistory) -> Self {
        Self {
            id: row.id,
            item_id: row.item_id,
            room: row.room,
            seal: row.seal,
            checked_at: row.checked_at,
            disposal_at: row.disposal_at,
            depreciation_at: row.depreciation_at,
            created_at: row.created_at,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(complex)]
pub struct ChildHistory {
    /// Id of the history row
    pub history_id: i32,
    pub item_id: i32,
    pub child_id: i32,
    pub name: Option<String>,
    pub room: Option<i32>,
    pub checked_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[ComplexObject]
impl ChildHistory {
    /// Composite id of the unit this row belongs to
    async fn id(&self) -> String {
        stockroom_common::types::ChildKey::new(self.item_id, self.child_id).to_string()
    }
}

impl From<models::ChildHistory> for ChildHistory {
    fn from(row: models::ChildHistory) -> Self {
        Self {
            history_id: row.id,
            item_id: row.item_id,
            child_id: row.child_id,
            name: row.name,
            room: row.room,
            checked_at: row.checked_at,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct User {
    pub id: i32,
    pub name: String,
}

impl From<models::User> for User {
    fn from(row: models::User) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(SimpleObject)]
pub struct Course {
    pub id: i32,
    pub name: String,
}

impl From<models::Course> for Course {
    fn from(row: models::Course) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(SimpleObject)]
pub struct Room {
    pub id: i32,
    pub number: i32,
}

impl From<models::Room> for Room {
    fn from(row: models::Room) -> Self {
        Self {
            id: row.id,
            number: row.number,
        }
    }
}

/// Outcome of a mutation
///
/// Structured failures come back with `success: false`, a message and a
/// `code`; server faults are reported as GraphQL errors instead.
#[derive(SimpleObject, Default)]
pub struct MutationResponse {
    pub success: bool,
    pub message: Option<String>,
    pub code: Option<FailureCode>,
    /// The item written by a single-item mutation
    pub item: Option<Item>,
    /// Items written by a batch mutation, in input order
    pub items: Vec<Item>,
    /// The child written by a single-child mutation
    pub child: Option<ChildItem>,
    /// Children written by a batch mutation, in input order
    pub children: Vec<ChildItem>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            code: Some(kind.into()),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_item(mut self, item: models::ItemSnapshot) -> Self {
        self.item = Some(Item(item));
        self
    }

    pub fn with_items(mut self, items: Vec<models::ItemSnapshot>) -> Self {
        self.items = items.into_iter().map(Item).collect();
        self
    }

    pub fn with_child(mut self, child: models::ChildSnapshot) -> Self {
        self.child = Some(ChildItem(child));
        self
    }

    pub fn with_children(mut self, children: Vec<models::ChildSnapshot>) -> Self {
        self.children = children.into_iter().map(ChildItem).collect();
        self
    }
}
