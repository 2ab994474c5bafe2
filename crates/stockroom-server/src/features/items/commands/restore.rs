//! Restore a soft-deleted item

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::shared::{Failure, FailureKind};
use crate::features::FeatureState;
use crate::models::{ItemId, ItemSnapshot};
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreItemCommand {
    pub id: ItemId,
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreItemError {
    #[error("Item {0} not found")]
    NotFound(ItemId),

    #[error("Item {0} is not deleted")]
    NotDeleted(ItemId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Failure for RestoreItemError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RestoreItemError::NotFound(_) => Some(FailureKind::NotFound),
            RestoreItemError::NotDeleted(_) => Some(FailureKind::NotDeleted),
            RestoreItemError::Store(_) => None,
        }
    }
}

impl Request<Result<ItemSnapshot, RestoreItemError>> for RestoreItemCommand {}

impl crate::cqrs::middleware::Command for RestoreItemCommand {
    const NAME: &'static str = "restore_item";
}

#[tracing::instrument(skip(state), fields(item_id = command.id))]
pub async fn handle(
    state: &FeatureState,
    command: RestoreItemCommand,
) -> Result<ItemSnapshot, RestoreItemError> {
    let store = state.store.as_ref();
    let item = store
        .find_item(command.id, true)
        .await?
        .ok_or(RestoreItemError::NotFound(command.id))?;

    if !item.is_deleted() {
        return Err(RestoreItemError::NotDeleted(command.id));
    }

    store.restore_item(command.id).await?;
    tracing::info!("Item restored");

    store
        .item_snapshot(command.id, false)
        .await?
        .ok_or(RestoreItemError::NotFound(command.id))
}
