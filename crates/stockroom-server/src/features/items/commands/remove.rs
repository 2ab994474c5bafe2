//! Soft-delete items

use chrono::Utc;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::shared::{Failure, FailureKind};
use crate::features::FeatureState;
use crate::models::ItemId;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveItemsCommand {
    pub ids: Vec<ItemId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveItemsResponse {
    /// How many active items were marked deleted
    pub removed: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveItemsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Failure for RemoveItemsError {
    fn failure_kind(&self) -> Option<FailureKind> {
        None
    }
}

impl Request<Result<RemoveItemsResponse, RemoveItemsError>> for RemoveItemsCommand {}

impl crate::cqrs::middleware::Command for RemoveItemsCommand {
    const NAME: &'static str = "remove_items";
}

/// Unknown and already deleted ids are skipped without error.
#[tracing::instrument(skip(state, command), fields(count = command.ids.len()))]
pub async fn handle(
    state: &FeatureState,
    command: RemoveItemsCommand,
) -> Result<RemoveItemsResponse, RemoveItemsError> {
    let removed = state.store.soft_delete_items(&command.ids, Utc::now()).await?;
    tracing::info!(removed, "Items removed");
    Ok(RemoveItemsResponse { removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestContext, TestItem};

    #[tokio::test]
    async fn test_remove_is_unconditional() {
        let ctx = TestContext::new();
        let a = TestItem::new("A", "Alpha").insert(&ctx.state).await;
        let b = TestItem::new("B", "Beta").insert(&ctx.state).await;

        let response = handle(
            &ctx.state,
            RemoveItemsCommand {
                ids: vec![a.id, 12345],
            },
        )
        .await
        .unwrap();
        assert_eq!(response.removed, 1);

        // Removing again changes nothing and still succeeds
        let response = handle(&ctx.state, RemoveItemsCommand { ids: vec![a.id] })
            .await
            .unwrap();
        assert_eq!(response.removed, 0);

        let active = ctx
            .state
            .store
            .list_item_snapshots(&Default::default())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }
}
