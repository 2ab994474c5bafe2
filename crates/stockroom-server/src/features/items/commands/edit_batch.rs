//! Apply one edit to several items in input order
//!
//! A supplied seal is copied once per item, each copy named after that
//! item's code.

use mediator::Request;

use super::edit::{self, EditItemError, ItemChanges};
use crate::features::shared::BatchError;
use crate::features::FeatureState;
use crate::models::{ItemId, ItemSnapshot};

#[derive(Debug)]
pub struct EditItemsCommand {
    pub ids: Vec<ItemId>,
    pub changes: ItemChanges,
}

pub type EditItemsError = BatchError<EditItemError>;

impl Request<Result<Vec<ItemSnapshot>, EditItemsError>> for EditItemsCommand {}

impl crate::cqrs::middleware::Command for EditItemsCommand {
    const NAME: &'static str = "edit_items";
}

#[tracing::instrument(skip(state, command), fields(count = command.ids.len()))]
pub async fn handle(
    state: &FeatureState,
    mut command: EditItemsCommand,
) -> Result<Vec<ItemSnapshot>, EditItemsError> {
    let mut edited = Vec::with_capacity(command.ids.len());
    for (index, id) in command.ids.iter().enumerate() {
        let snapshot = edit::apply(state, *id, &mut command.changes)
            .await
            .map_err(|e| BatchError::new(index, e))?;
        edited.push(snapshot);
    }
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{date, upload, TestContext, TestItem};
    use crate::features::shared::{Failure, FailureKind};

    #[tokio::test]
    async fn test_partial_batch_stays_committed() {
        let ctx = TestContext::new();
        let first = TestItem::new("A", "Alpha").insert(&ctx.state).await;

        let err = handle(
            &ctx.state,
            EditItemsCommand {
                ids: vec![first.id, 999],
                changes: ItemChanges {
                    checked_at: Some(Some(date(2024, 3, 3))),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.failure_kind(), Some(FailureKind::NotFound));

        let current = ctx.state.store.item_snapshot(first.id, false).await.unwrap().unwrap();
        assert_eq!(current.checked_at, Some(date(2024, 3, 3)));
    }

    #[tokio::test]
    async fn test_one_seal_for_every_item() {
        let ctx = TestContext::new();
        let a = TestItem::new("A", "Alpha").insert(&ctx.state).await;
        let b = TestItem::new("B", "Beta").insert(&ctx.state).await;

        let edited = handle(
            &ctx.state,
            EditItemsCommand {
                ids: vec![a.id, b.id],
                changes: ItemChanges {
                    seal: Some(upload("s.png", "image/png", b"seal-bytes").await),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        assert!(edited.iter().all(|i| i.seal.as_deref() == Some(".png")));
        for code in ["A", "B"] {
            let bytes = std::fs::read(ctx.state.seals.path_for(code, ".png")).unwrap();
            assert_eq!(bytes, b"seal-bytes");
        }
    }
}
