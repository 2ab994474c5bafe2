//! Current state of every child matching a filter
//!
//! Visibility applies to the child's own deletion marker; children of a
//! deleted item are still listed while the child itself is active.

use mediator::Request;
use stockroom_common::types::Visibility;

use crate::features::FeatureState;
use crate::models::{normalize_search, ChildFilter, ChildSnapshot, ItemId};
use crate::store::StoreError;

#[derive(Debug, Clone, Default)]
pub struct ListChildrenQuery {
    pub item_id: Option<ItemId>,
    pub search: Option<String>,
    pub visibility: Visibility,
}

#[derive(Debug, thiserror::Error)]
pub enum ListChildrenError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Vec<ChildSnapshot>, ListChildrenError>> for ListChildrenQuery {}

impl crate::cqrs::middleware::Query for ListChildrenQuery {
    const NAME: &'static str = "children";
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    query: ListChildrenQuery,
) -> Result<Vec<ChildSnapshot>, ListChildrenError> {
    let filter = ChildFilter {
        item_id: query.item_id,
        search: normalize_search(query.search.as_deref()),
        visibility: query.visibility,
    };
    Ok(state.store.list_child_snapshots(&filter).await?)
}
