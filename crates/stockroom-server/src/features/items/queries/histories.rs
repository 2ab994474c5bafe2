//! Every version of one item, newest first

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::FeatureState;
use crate::models::{ItemHistory, ItemId};
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemHistoriesQuery {
    pub item_id: ItemId,
}

#[derive(Debug, thiserror::Error)]
pub enum ItemHistoriesError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Vec<ItemHistory>, ItemHistoriesError>> for ItemHistoriesQuery {}

impl crate::cqrs::middleware::Query for ItemHistoriesQuery {
    const NAME: &'static str = "item_histories";
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    query: ItemHistoriesQuery,
) -> Result<Vec<ItemHistory>, ItemHistoriesError> {
    Ok(state.store.item_histories(query.item_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::items::commands::edit::{self, EditItemCommand, ItemChanges};
    use crate::features::shared::test_helpers::{TestContext, TestItem};

    #[tokio::test]
    async fn test_histories_newest_first_with_room() {
        let ctx = TestContext::new();
        let item = TestItem::new("A", "Alpha").with_room(1).insert(&ctx.state).await;
        edit::handle(
            &ctx.state,
            EditItemCommand {
                id: item.id,
                changes: ItemChanges {
                    room: Some(2),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        let histories = handle(&ctx.state, ItemHistoriesQuery { item_id: item.id })
            .await
            .unwrap();
        let rooms: Vec<_> = histories.iter().map(|h| h.room).collect();
        assert_eq!(rooms, vec![2, 1]);
        assert!(histories[0].id > histories[1].id);
    }
}
