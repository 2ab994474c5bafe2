//! Restore a soft-deleted child
//!
//! Clears the deletion marker on every history row of the pair, not only
//! the newest. Restoring an active child is not an error.

use mediator::Request;
use serde::{Deserialize, Serialize};
use stockroom_common::types::ChildKey;

use crate::features::shared::{Failure, FailureKind};
use crate::features::FeatureState;
use crate::models::ChildSnapshot;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreChildCommand {
    pub child_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreChildError {
    #[error("Malformed child id '{0}'")]
    MalformedId(String),

    #[error("Child {0} not found")]
    NotFound(ChildKey),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Failure for RestoreChildError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RestoreChildError::MalformedId(_) => Some(FailureKind::MalformedId),
            RestoreChildError::NotFound(_) => Some(FailureKind::NotFound),
            RestoreChildError::Store(_) => None,
        }
    }
}

impl Request<Result<ChildSnapshot, RestoreChildError>> for RestoreChildCommand {}

impl crate::cqrs::middleware::Command for RestoreChildCommand {
    const NAME: &'static str = "restore_child";
}

#[tracing::instrument(skip(state), fields(child_id = %command.child_id))]
pub async fn handle(
    state: &FeatureState,
    command: RestoreChildCommand,
) -> Result<ChildSnapshot, RestoreChildError> {
    let key: ChildKey = command
        .child_id
        .parse()
        .map_err(|_| RestoreChildError::MalformedId(command.child_id.clone()))?;

    let store = state.store.as_ref();
    let touched = store.restore_child(key).await?;
    if touched == 0 {
        return Err(RestoreChildError::NotFound(key));
    }
    tracing::info!(rows = touched, "Child restored");

    store
        .child_snapshot(key, true)
        .await?
        .ok_or(RestoreChildError::NotFound(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::children::commands::edit::{self, ChildChanges, EditChildCommand};
    use crate::features::children::commands::remove::{self, RemoveChildrenCommand};
    use crate::features::shared::test_helpers::{TestContext, TestItem};

    #[tokio::test]
    async fn test_restore_clears_every_row() {
        let ctx = TestContext::new();
        let item = TestItem::new("A", "Alpha").with_amount(2).insert(&ctx.state).await;
        let id = format!("{},1", item.id);

        edit::handle(
            &ctx.state,
            EditChildCommand {
                child_id: id.clone(),
                changes: ChildChanges {
                    name: Some(Some("Left".to_string())),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
        remove::handle(&ctx.state, RemoveChildrenCommand { child_ids: vec![id.clone()] })
            .await
            .unwrap();

        let restored = handle(&ctx.state, RestoreChildCommand { child_id: id })
            .await
            .unwrap();
        assert!(!restored.is_deleted());
        assert_eq!(restored.display_name(), "Left");

        let rows = ctx
            .state
            .store
            .child_histories(ChildKey::new(item.id, 1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.deleted_at.is_none()));
    }

    #[tokio::test]
    async fn test_restore_active_child_succeeds() {
        let ctx = TestContext::new();
        let item = TestItem::new("A", "Alpha").with_amount(2).insert(&ctx.state).await;
        let restored = handle(
            &ctx.state,
            RestoreChildCommand {
                child_id: format!("{},2", item.id),
            },
        )
        .await
        .unwrap();
        assert_eq!(restored.child_id, 2);
    }

    #[tokio::test]
    async fn test_restore_unknown_child() {
        let ctx = TestContext::new();
        let err = handle(&ctx.state, RestoreChildCommand { child_id: "1,9".into() })
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::NotFound));

        let err = handle(&ctx.state, RestoreChildCommand { child_id: "1;9".into() })
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::MalformedId));
    }
}
