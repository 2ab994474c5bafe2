//! Soft-delete children

use chrono::Utc;
use mediator::Request;
use serde::{Deserialize, Serialize};
use stockroom_common::types::ChildKey;

use crate::features::shared::{Failure, FailureKind};
use crate::features::FeatureState;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveChildrenCommand {
    pub child_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveChildrenResponse {
    /// Number of history rows marked deleted
    pub removed_rows: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveChildrenError {
    #[error("Malformed child id '{0}'")]
    MalformedId(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Failure for RemoveChildrenError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RemoveChildrenError::MalformedId(_) => Some(FailureKind::MalformedId),
            RemoveChildrenError::Store(_) => None,
        }
    }
}

impl Request<Result<RemoveChildrenResponse, RemoveChildrenError>> for RemoveChildrenCommand {}

impl crate::cqrs::middleware::Command for RemoveChildrenCommand {
    const NAME: &'static str = "remove_children";
}

/// Every id is parsed before anything is deleted; one malformed id rejects
/// the whole request.
#[tracing::instrument(skip(state, command), fields(count = command.child_ids.len()))]
pub async fn handle(
    state: &FeatureState,
    command: RemoveChildrenCommand,
) -> Result<RemoveChildrenResponse, RemoveChildrenError> {
    let keys = command
        .child_ids
        .iter()
        .map(|raw| {
            raw.parse::<ChildKey>()
                .map_err(|_| RemoveChildrenError::MalformedId(raw.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let removed_rows = state.store.soft_delete_children(&keys, Utc::now()).await?;
    tracing::info!(removed_rows, "Children removed");
    Ok(RemoveChildrenResponse { removed_rows })
}
