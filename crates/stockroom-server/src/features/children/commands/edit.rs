//! Edit child command
//!
//! Appends a new version of one child unit. Edits that would not change
//! anything are rejected so the history only grows on real changes.

use chrono::{DateTime, NaiveDate, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use stockroom_common::types::ChildKey;

use crate::features::lookups::{resolve, Identity};
use crate::features::shared::{
    validate_name, Failure, FailureKind, NameValidationError, MAX_NAME_LENGTH,
};
use crate::features::FeatureState;
use crate::models::{ChildSnapshot, NewChildHistory};
use crate::store::StoreError;

/// Fields a child edit may change
///
/// `None` keeps the current value and `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildChanges {
    /// Name override of this unit
    pub name: Option<Option<String>>,
    pub room: Option<Option<i32>>,
    pub checked_at: Option<Option<NaiveDate>>,
    /// Backdated creation time of the new row; not a change by itself
    pub created_at: Option<DateTime<Utc>>,
}

impl ChildChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.room.is_none() && self.checked_at.is_none()
    }

    /// Whether every supplied field already holds its current value
    pub fn matches(&self, current: &ChildSnapshot) -> bool {
        let name_same = self.name.as_ref().map_or(true, |name| &current.name == name);
        let room_same = self.room.map_or(true, |room| current.room == room);
        let checked_same = self
            .checked_at
            .map_or(true, |date| current.checked_at == date);
        name_same && room_same && checked_same
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditChildCommand {
    /// External id `"<itemId>,<childId>"`
    pub child_id: String,
    pub changes: ChildChanges,
}

#[derive(Debug, thiserror::Error)]
pub enum EditChildError {
    #[error("Malformed child id '{0}'")]
    MalformedId(String),

    #[error("Edit needs at least one field besides createdAt")]
    NoOpEdit,

    #[error("Validation failed: {0}")]
    Validation(#[from] NameValidationError),

    #[error("Child {0} not found")]
    NotFound(ChildKey),

    #[error("Child {0} already has these values")]
    NoChange(ChildKey),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Failure for EditChildError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            EditChildError::MalformedId(_) => Some(FailureKind::MalformedId),
            EditChildError::NoOpEdit => Some(FailureKind::NoOpEdit),
            EditChildError::Validation(_) => Some(FailureKind::Validation),
            EditChildError::NotFound(_) => Some(FailureKind::NotFound),
            EditChildError::NoChange(_) => Some(FailureKind::NoChange),
            EditChildError::Store(_) => None,
        }
    }
}

impl Request<Result<ChildSnapshot, EditChildError>> for EditChildCommand {}

impl crate::cqrs::middleware::Command for EditChildCommand {
    const NAME: &'static str = "edit_child";
}

pub(crate) fn parse_key(raw: &str) -> Result<ChildKey, EditChildError> {
    raw.parse()
        .map_err(|_| EditChildError::MalformedId(raw.to_string()))
}

#[tracing::instrument(skip(state, command), fields(child_id = %command.child_id))]
pub async fn handle(
    state: &FeatureState,
    command: EditChildCommand,
) -> Result<ChildSnapshot, EditChildError> {
    apply(state, &command.child_id, &command.changes).await
}

/// Append one edit of the child `raw_id`; shared with the batch edit
pub(crate) async fn apply(
    state: &FeatureState,
    raw_id: &str,
    changes: &ChildChanges,
) -> Result<ChildSnapshot, EditChildError> {
    let key = parse_key(raw_id)?;
    if changes.is_empty() {
        return Err(EditChildError::NoOpEdit);
    }
    if let Some(Some(ref name)) = changes.name {
        validate_name(name, "name", MAX_NAME_LENGTH)?;
    }

    let store = state.store.as_ref();
    let current = store
        .child_snapshot(key, false)
        .await?
        .ok_or(EditChildError::NotFound(key))?;

    if changes.matches(&current) {
        return Err(EditChildError::NoChange(key));
    }

    let room_id = match changes.room {
        Some(Some(number)) if current.room != Some(number) => {
            Some(resolve(store, Identity::Room(number)).await?)
        },
        Some(None) => None,
        _ => current.room_id,
    };

    let appended = store
        .append_child_history(NewChildHistory {
            key,
            name: changes.name.clone().unwrap_or(current.name),
            room_id,
            checked_at: changes.checked_at.unwrap_or(current.checked_at),
            created_at: changes.created_at,
        })
        .await?;
    tracing::info!(child = %key, history_id = appended.id, "Child edited");

    store
        .child_snapshot(key, false)
        .await?
        .ok_or(EditChildError::NotFound(key))
}
