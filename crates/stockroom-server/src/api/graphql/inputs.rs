//! GraphQL input objects and their conversion into feature commands

use async_graphql::{Context, InputObject, MaybeUndefined, Upload};
use chrono::{DateTime, NaiveDate, Utc};
use tokio::fs::File;

use crate::features::children::commands::ChildChanges;
use crate::features::items::commands::{AddItemCommand, ItemChanges};
use crate::storage::SealUpload;

/// Open an uploaded file as a seal upload
///
/// The upload's temp file is duplicated, so the same upload value can be
/// opened more than once.
pub fn seal_upload(ctx: &Context<'_>, upload: &Upload) -> async_graphql::Result<SealUpload> {
    let value = upload.value(ctx)?;
    Ok(SealUpload::new(
        value.filename,
        value.content_type,
        File::from_std(value.content),
    ))
}

/// Split an explicit `null` from an omitted field
fn supplied<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(value) => Some(Some(value)),
    }
}

#[derive(InputObject)]
pub struct AddItemInput {
    pub code: String,
    pub name: String,
    pub amount: i32,
    pub admin: String,
    pub course: String,
    pub room: i32,
    pub purchased_at: NaiveDate,
    pub checked_at: Option<NaiveDate>,
    pub disposal_at: Option<NaiveDate>,
    pub depreciation_at: Option<NaiveDate>,
    /// Backdated creation time for imported records
    pub created_at: Option<DateTime<Utc>>,
    pub seal: Option<Upload>,
}

impl AddItemInput {
    pub fn into_command(self, ctx: &Context<'_>) -> async_graphql::Result<AddItemCommand> {
        let seal = self
            .seal
            .as_ref()
            .map(|upload| seal_upload(ctx, upload))
            .transpose()?;
        Ok(AddItemCommand {
            code: self.code,
            name: self.name,
            amount: self.amount,
            admin: self.admin,
            course: self.course,
            room: self.room,
            purchased_at: self.purchased_at,
            checked_at: self.checked_at,
            disposal_at: self.disposal_at,
            depreciation_at: self.depreciation_at,
            created_at: self.created_at,
            seal,
        })
    }
}

/// Fields of an item edit
///
/// Omitted fields keep their current value; a date set to `null` is cleared.
#[derive(InputObject)]
pub struct EditItemInput {
    pub room: Option<i32>,
    pub checked_at: MaybeUndefined<NaiveDate>,
    pub disposal_at: MaybeUndefined<NaiveDate>,
    pub depreciation_at: MaybeUndefined<NaiveDate>,
    pub seal: Option<Upload>,
}

impl EditItemInput {
    pub fn into_changes(self, ctx: &Context<'_>) -> async_graphql::Result<ItemChanges> {
        let seal = self
            .seal
            .as_ref()
            .map(|upload| seal_upload(ctx, upload))
            .transpose()?;
        Ok(ItemChanges {
            room: self.room,
            checked_at: supplied(self.checked_at),
            disposal_at: supplied(self.disposal_at),
            depreciation_at: supplied(self.depreciation_at),
            seal,
        })
    }
}

/// Fields of a child edit; omitted fields keep their current value
#[derive(InputObject)]
pub struct EditChildInput {
    pub name: MaybeUndefined<String>,
    pub room: MaybeUndefined<i32>,
    pub checked_at: MaybeUndefined<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<EditChildInput> for ChildChanges {
    fn from(input: EditChildInput) -> Self {
        Self {
            name: supplied(input.name),
            room: supplied(input.room),
            checked_at: supplied(input.checked_at),
            created_at: input.created_at,
        }
    }
}
