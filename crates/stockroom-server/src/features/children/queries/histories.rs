//! Every version of one child, newest first, deleted rows included

use mediator::Request;
use serde::{Deserialize, Serialize};
use stockroom_common::types::ChildKey;

use crate::features::FeatureState;
use crate::models::ChildHistory;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildHistoriesQuery {
    pub key: ChildKey,
}

#[derive(Debug, thiserror::Error)]
pub enum ChildHistoriesError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Vec<ChildHistory>, ChildHistoriesError>> for ChildHistoriesQuery {}

impl crate::cqrs::middleware::Query for ChildHistoriesQuery {
    const NAME: &'static str = "child_histories";
}

/// Rows without a name override carry the parent item's name.
#[tracing::instrument(skip(state), fields(child = %query.key))]
pub async fn handle(
    state: &FeatureState,
    query: ChildHistoriesQuery,
) -> Result<Vec<ChildHistory>, ChildHistoriesError> {
    let store = state.store.as_ref();
    let mut rows = store.child_histories(query.key).await?;

    if let Some(item) = store.find_item(query.key.item_id, true).await? {
        for row in rows.iter_mut().filter(|r| r.name.is_none()) {
            row.name = Some(item.name.clone());
        }
    }
    Ok(rows)
}
