//! Add item command
//!
//! Creates the identity row of a new item, its first history row and, for
//! multi-unit items, one child per unit. Input is validated completely
//! (including the seal's MIME type) before anything is written.

use chrono::{DateTime, NaiveDate, Utc};
use mediator::Request;

use crate::features::lookups::{resolve, Identity};
use crate::features::shared::{
    validate_amount, validate_name, AmountValidationError, Failure, FailureKind,
    NameValidationError, MAX_NAME_LENGTH,
};
use crate::features::FeatureState;
use crate::models::{ItemId, ItemSnapshot, NewItem, NewItemHistory};
use crate::storage::{check_key, SealError, SealUpload};
use crate::store::StoreError;

/// Command to add a new item
#[derive(Debug)]
pub struct AddItemCommand {
    /// Unique inventory code, also the key of the seal image
    pub code: String,
    pub name: String,
    /// Number of physical units; more than one seeds numbered children
    pub amount: i32,
    /// Administrator name, created on first use
    pub admin: String,
    /// Course name, created on first use
    pub course: String,
    /// Room number, created on first use
    pub room: i32,
    pub purchased_at: NaiveDate,
    pub checked_at: Option<NaiveDate>,
    pub disposal_at: Option<NaiveDate>,
    pub depreciation_at: Option<NaiveDate>,
    /// Backdated creation time for imported records
    pub created_at: Option<DateTime<Utc>>,
    pub seal: Option<SealUpload>,
}

/// Errors that can occur when adding an item
#[derive(Debug, thiserror::Error)]
pub enum AddItemError {
    #[error("Validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("Validation failed: {0}")]
    AmountValidation(#[from] AmountValidationError),

    #[error("Code '{0}' is not unique")]
    DuplicateCode(String),

    #[error(transparent)]
    Seal(#[from] SealError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Item {0} has no current state after insert")]
    Incomplete(ItemId),
}

impl Failure for AddItemError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AddItemError::NameValidation(_) | AddItemError::AmountValidation(_) => {
                Some(FailureKind::Validation)
            },
            AddItemError::DuplicateCode(_) => Some(FailureKind::DuplicateCode),
            AddItemError::Seal(e) => e.failure_kind(),
            AddItemError::Store(_) | AddItemError::Incomplete(_) => None,
        }
    }
}

impl Request<Result<ItemSnapshot, AddItemError>> for AddItemCommand {}

impl crate::cqrs::middleware::Command for AddItemCommand {
    const NAME: &'static str = "add_item";
}

impl AddItemCommand {
    /// Validates the command parameters
    ///
    /// # Errors
    ///
    /// - `code`, `name`, `admin` and `course` must be non-blank
    /// - `amount` must be at least 1
    /// - a supplied seal must have an `image/*` MIME type, and the code must
    ///   be usable as its file name
    #[tracing::instrument(skip(self), fields(code = %self.code))]
    pub fn validate(&self) -> Result<(), AddItemError> {
        validate_name(&self.code, "code", MAX_NAME_LENGTH)?;
        validate_name(&self.name, "name", MAX_NAME_LENGTH)?;
        validate_name(&self.admin, "admin", MAX_NAME_LENGTH)?;
        validate_name(&self.course, "course", MAX_NAME_LENGTH)?;
        validate_amount(self.amount)?;

        if let Some(ref seal) = self.seal {
            seal.check_type()?;
            check_key(&self.code)?;
        }

        tracing::debug!("Command validation passed");
        Ok(())
    }
}

/// Handler for adding an item
///
/// # Errors
///
/// - Validation errors if command parameters are invalid
/// - `DuplicateCode` if the code is taken, including by a deleted item
/// - Store and IO errors
#[tracing::instrument(
    skip(state, command),
    fields(code = %command.code, amount = command.amount)
)]
pub async fn handle(
    state: &FeatureState,
    mut command: AddItemCommand,
) -> Result<ItemSnapshot, AddItemError> {
    command.validate()?;

    let store = state.store.as_ref();
    let admin_id = resolve(store, Identity::Admin(&command.admin)).await?;
    let course_id = resolve(store, Identity::Course(&command.course)).await?;
    let room_id = resolve(store, Identity::Room(command.room)).await?;

    let item = store
        .insert_item(NewItem {
            code: command.code.clone(),
            name: command.name.clone(),
            amount: command.amount,
            admin_id,
            course_id,
            purchased_at: command.purchased_at,
            created_at: command.created_at,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => AddItemError::DuplicateCode(command.code.clone()),
            other => AddItemError::Store(other),
        })?;

    if command.amount > 1 {
        let seeded = store
            .seed_children(item.id, command.amount, command.created_at)
            .await?;
        tracing::debug!(seeded, "Children seeded");
    }

    // The seal is written only once the code is known to be free, so a
    // duplicate never overwrites another item's file. An IO failure here
    // leaves the item row without history: it is invisible to every listing
    // and its code stays taken.
    let seal = match command.seal.as_mut() {
        Some(upload) => Some(state.seals.store(upload, &item.code).await?),
        None => None,
    };

    store
        .append_item_history(NewItemHistory {
            item_id: item.id,
            room_id,
            seal,
            checked_at: command.checked_at,
            disposal_at: command.disposal_at,
            depreciation_at: command.depreciation_at,
        })
        .await?;

    tracing::info!(item_id = item.id, "Item added");

    store
        .item_snapshot(item.id, true)
        .await?
        .ok_or(AddItemError::Incomplete(item.id))
}
