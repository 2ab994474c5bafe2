//! Current state of one item

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::FeatureState;
use crate::models::{ItemId, ItemSnapshot};
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetItemQuery {
    pub id: ItemId,
}

#[derive(Debug, thiserror::Error)]
pub enum GetItemError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Option<ItemSnapshot>, GetItemError>> for GetItemQuery {}

impl crate::cqrs::middleware::Query for GetItemQuery {
    const NAME: &'static str = "item";
}

/// Soft-deleted items are returned too; `None` only when the id is unknown.
#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    query: GetItemQuery,
) -> Result<Option<ItemSnapshot>, GetItemError> {
    Ok(state.store.item_snapshot(query.id, true).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestContext, TestItem};

    #[tokio::test]
    async fn test_get_includes_deleted() {
        let ctx = TestContext::new();
        let item = TestItem::new("A", "Alpha").insert(&ctx.state).await;
        ctx.state
            .store
            .soft_delete_items(&[item.id], chrono::Utc::now())
            .await
            .unwrap();

        let found = handle(&ctx.state, GetItemQuery { id: item.id })
            .await
            .unwrap()
            .unwrap();
        assert!(found.is_deleted());

        assert!(handle(&ctx.state, GetItemQuery { id: 77 }).await.unwrap().is_none());
    }
}
