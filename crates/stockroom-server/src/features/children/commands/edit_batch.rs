//! Apply one child edit to several children in input order

use mediator::Request;
use serde::{Deserialize, Serialize};

use super::edit::{self, ChildChanges, EditChildError};
use crate::features::shared::BatchError;
use crate::features::FeatureState;
use crate::models::ChildSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditChildrenCommand {
    pub child_ids: Vec<String>,
    pub changes: ChildChanges,
}

pub type EditChildrenError = BatchError<EditChildError>;

impl Request<Result<Vec<ChildSnapshot>, EditChildrenError>> for EditChildrenCommand {}

impl crate::cqrs::middleware::Command for EditChildrenCommand {
    const NAME: &'static str = "edit_children";
}

/// Ids are parsed one at a time, so a malformed id stops the batch at its
/// position with every earlier edit applied.
#[tracing::instrument(skip(state, command), fields(count = command.child_ids.len()))]
pub async fn handle(
    state: &FeatureState,
    command: EditChildrenCommand,
) -> Result<Vec<ChildSnapshot>, EditChildrenError> {
    let mut edited = Vec::with_capacity(command.child_ids.len());
    for (index, child_id) in command.child_ids.iter().enumerate() {
        let snapshot = edit::apply(state, child_id, &command.changes)
            .await
            .map_err(|e| BatchError::new(index, e))?;
        edited.push(snapshot);
    }
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestContext, TestItem};
    use crate::features::shared::{Failure, FailureKind};
    use stockroom_common::types::ChildKey;

    #[tokio::test]
    async fn test_stops_at_malformed_id() {
        let ctx = TestContext::new();
        let item = TestItem::new("D-1", "Desk").with_amount(3).insert(&ctx.state).await;

        let err = handle(
            &ctx.state,
            EditChildrenCommand {
                child_ids: vec![
                    format!("{},1", item.id),
                    "broken".to_string(),
                    format!("{},3", item.id),
                ],
                changes: ChildChanges {
                    room: Some(Some(8)),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.failure_kind(), Some(FailureKind::MalformedId));

        let store = &ctx.state.store;
        let first = store.child_snapshot(ChildKey::new(item.id, 1), false).await.unwrap().unwrap();
        let third = store.child_snapshot(ChildKey::new(item.id, 3), false).await.unwrap().unwrap();
        assert_eq!(first.room, Some(8));
        assert_eq!(third.room, None);
    }
}
