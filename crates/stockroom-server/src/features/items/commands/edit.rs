//! Edit item command
//!
//! An edit never touches existing rows: it appends a new history row that
//! starts as a copy of the current one with the supplied fields overridden.
//! A date supplied as `Some(None)` is cleared in the new row.

use chrono::NaiveDate;
use mediator::Request;

use crate::features::lookups::{resolve, Identity};
use crate::features::shared::{Failure, FailureKind};
use crate::features::FeatureState;
use crate::models::{ItemId, ItemSnapshot, NewItemHistory};
use crate::storage::{SealError, SealUpload};
use crate::store::StoreError;

/// Fields an edit may change; `None` keeps the current value
#[derive(Debug, Default)]
pub struct ItemChanges {
    pub room: Option<i32>,
    pub checked_at: Option<Option<NaiveDate>>,
    pub disposal_at: Option<Option<NaiveDate>>,
    pub depreciation_at: Option<Option<NaiveDate>>,
    /// Replaces the stored seal; the previous seal is kept when absent
    pub seal: Option<SealUpload>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.room.is_none()
            && self.checked_at.is_none()
            && self.disposal_at.is_none()
            && self.depreciation_at.is_none()
            && self.seal.is_none()
    }
}

#[derive(Debug)]
pub struct EditItemCommand {
    pub id: ItemId,
    pub changes: ItemChanges,
}

#[derive(Debug, thiserror::Error)]
pub enum EditItemError {
    #[error("Edit needs at least one field")]
    NoOpEdit,

    #[error("Item {0} not found")]
    NotFound(ItemId),

    #[error(transparent)]
    Seal(#[from] SealError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Failure for EditItemError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            EditItemError::NoOpEdit => Some(FailureKind::NoOpEdit),
            EditItemError::NotFound(_) => Some(FailureKind::NotFound),
            EditItemError::Seal(e) => e.failure_kind(),
            EditItemError::Store(_) => None,
        }
    }
}

impl Request<Result<ItemSnapshot, EditItemError>> for EditItemCommand {}

impl crate::cqrs::middleware::Command for EditItemCommand {
    const NAME: &'static str = "edit_item";
}

#[tracing::instrument(skip(state, command), fields(item_id = command.id))]
pub async fn handle(
    state: &FeatureState,
    mut command: EditItemCommand,
) -> Result<ItemSnapshot, EditItemError> {
    apply(state, command.id, &mut command.changes).await
}

/// Append one edit of `id`; shared with the batch edit
///
/// Takes the changes by mutable reference so one seal upload can be
/// copied for several items.
pub(crate) async fn apply(
    state: &FeatureState,
    id: ItemId,
    changes: &mut ItemChanges,
) -> Result<ItemSnapshot, EditItemError> {
    if changes.is_empty() {
        return Err(EditItemError::NoOpEdit);
    }
    if let Some(ref seal) = changes.seal {
        seal.check_type()?;
    }

    let store = state.store.as_ref();
    let item = store
        .find_item(id, false)
        .await?
        .ok_or(EditItemError::NotFound(id))?;
    let current = store
        .current_item_history(id)
        .await?
        .ok_or(EditItemError::NotFound(id))?;

    let mut next = NewItemHistory::carry_forward(&current);

    if let Some(number) = changes.room {
        next.room_id = resolve(store, Identity::Room(number)).await?;
    }
    if let Some(upload) = changes.seal.as_mut() {
        next.seal = Some(state.seals.store(upload, &item.code).await?);
    }
    if let Some(date) = changes.checked_at {
        next.checked_at = date;
    }
    if let Some(date) = changes.disposal_at {
        next.disposal_at = date;
    }
    if let Some(date) = changes.depreciation_at {
        next.depreciation_at = date;
    }

    let appended = store.append_item_history(next).await?;
    tracing::info!(item_id = id, history_id = appended.id, "Item edited");

    store
        .item_snapshot(id, false)
        .await?
        .ok_or(EditItemError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{date, upload, TestContext, TestItem};

    fn checked(d: NaiveDate) -> ItemChanges {
        ItemChanges {
            checked_at: Some(Some(d)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_latest_edit_wins() {
        let ctx = TestContext::new();
        let item = TestItem::new("D-1", "Desk").insert(&ctx.state).await;

        for day in [1, 2, 3] {
            handle(
                &ctx.state,
                EditItemCommand {
                    id: item.id,
                    changes: checked(date(2024, 5, day)),
                },
            )
            .await
            .unwrap();
        }

        let current = ctx.state.store.item_snapshot(item.id, true).await.unwrap().unwrap();
        assert_eq!(current.checked_at, Some(date(2024, 5, 3)));

        let histories = ctx.state.store.item_histories(item.id).await.unwrap();
        assert_eq!(histories.len(), 4);
        // Earlier versions are untouched
        assert_eq!(histories[3].checked_at, None);
        assert_eq!(histories[2].checked_at, Some(date(2024, 5, 1)));
    }

    #[tokio::test]
    async fn test_edit_carries_unchanged_fields() {
        let ctx = TestContext::new();
        let mut command = TestItem::new("D-1", "Desk").command();
        command.disposal_at = Some(date(2030, 1, 1));
        command.seal = Some(upload("seal.jpg", "image/jpeg", b"jpg").await);
        let item = super::super::add::handle(&ctx.state, command).await.unwrap();

        let edited = handle(
            &ctx.state,
            EditItemCommand {
                id: item.id,
                changes: ItemChanges {
                    room: Some(99),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.room, 99);
        assert_eq!(edited.disposal_at, Some(date(2030, 1, 1)));
        assert_eq!(edited.seal.as_deref(), Some(".jpg"));
    }

    #[tokio::test]
    async fn test_new_seal_replaces_extension() {
        let ctx = TestContext::new();
        let item = TestItem::new("D-1", "Desk").insert(&ctx.state).await;

        let edited = handle(
            &ctx.state,
            EditItemCommand {
                id: item.id,
                changes: ItemChanges {
                    seal: Some(upload("new.webp", "image/webp", b"webp").await),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.seal.as_deref(), Some(".webp"));
        assert!(ctx.state.seals.path_for("D-1", ".webp").exists());
    }

    #[tokio::test]
    async fn test_null_date_clears_value() {
        let ctx = TestContext::new();
        let item = TestItem::new("D-1", "Desk").insert(&ctx.state).await;

        let set = handle(
            &ctx.state,
            EditItemCommand {
                id: item.id,
                changes: ItemChanges {
                    disposal_at: Some(Some(date(2030, 1, 1))),
                    checked_at: Some(Some(date(2024, 2, 2))),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
        assert_eq!(set.disposal_at, Some(date(2030, 1, 1)));

        let cleared = handle(
            &ctx.state,
            EditItemCommand {
                id: item.id,
                changes: ItemChanges {
                    disposal_at: Some(None),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.disposal_at, None);
        assert_eq!(cleared.checked_at, Some(date(2024, 2, 2)));

        let histories = ctx.state.store.item_histories(item.id).await.unwrap();
        assert_eq!(histories.len(), 3);
        assert_eq!(histories[1].disposal_at, Some(date(2030, 1, 1)));
    }

    #[tokio::test]
    async fn test_empty_edit_is_noop() {
        let ctx = TestContext::new();
        let item = TestItem::new("D-1", "Desk").insert(&ctx.state).await;

        let err = handle(
            &ctx.state,
            EditItemCommand {
                id: item.id,
                changes: ItemChanges::default(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::NoOpEdit));
        assert_eq!(ctx.state.store.item_histories(item.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_or_deleted_item_not_found() {
        let ctx = TestContext::new();
        let err = handle(
            &ctx.state,
            EditItemCommand {
                id: 404,
                changes: checked(date(2024, 1, 1)),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EditItemError::NotFound(404)));

        let item = TestItem::new("D-1", "Desk").insert(&ctx.state).await;
        ctx.state
            .store
            .soft_delete_items(&[item.id], chrono::Utc::now())
            .await
            .unwrap();
        let err = handle(
            &ctx.state,
            EditItemCommand {
                id: item.id,
                changes: checked(date(2024, 1, 1)),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::NotFound));
    }
}
