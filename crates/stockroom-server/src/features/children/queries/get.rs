//! Current state of one child

use mediator::Request;
use serde::{Deserialize, Serialize};
use stockroom_common::types::ChildKey;

use crate::features::FeatureState;
use crate::models::ChildSnapshot;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetChildQuery {
    pub child_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetChildError {
    #[error("Malformed child id '{0}'")]
    MalformedId(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Option<ChildSnapshot>, GetChildError>> for GetChildQuery {}

impl crate::cqrs::middleware::Query for GetChildQuery {
    const NAME: &'static str = "child";
}

/// Soft-deleted children are returned too.
#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    query: GetChildQuery,
) -> Result<Option<ChildSnapshot>, GetChildError> {
    let key: ChildKey = query
        .child_id
        .parse()
        .map_err(|_| GetChildError::MalformedId(query.child_id.clone()))?;
    Ok(state.store.child_snapshot(key, true).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestContext, TestItem};

    #[tokio::test]
    async fn test_get_child_falls_back_to_item_name() {
        let ctx = TestContext::new();
        let item = TestItem::new("D-1", "Desk").with_amount(2).insert(&ctx.state).await;

        let child = handle(
            &ctx.state,
            GetChildQuery {
                child_id: format!("{},2", item.id),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(child.display_name(), "Desk");
        assert_eq!(child.code, "D-1");
        assert_eq!(child.key().to_string(), format!("{},2", item.id));
    }

    #[tokio::test]
    async fn test_get_child_rejects_malformed_id() {
        let ctx = TestContext::new();
        let err = handle(&ctx.state, GetChildQuery { child_id: "1".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, GetChildError::MalformedId(_)));
    }
}
