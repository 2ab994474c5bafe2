//! Add several items in input order, stopping at the first failure

use mediator::Request;

use super::add::{self, AddItemCommand, AddItemError};
use crate::features::shared::BatchError;
use crate::features::FeatureState;
use crate::models::ItemSnapshot;

#[derive(Debug)]
pub struct AddItemsCommand {
    pub items: Vec<AddItemCommand>,
}

pub type AddItemsError = BatchError<AddItemError>;

impl Request<Result<Vec<ItemSnapshot>, AddItemsError>> for AddItemsCommand {}

impl crate::cqrs::middleware::Command for AddItemsCommand {
    const NAME: &'static str = "add_items";
}

/// Elements before a failing one stay committed.
#[tracing::instrument(skip(state, command), fields(count = command.items.len()))]
pub async fn handle(
    state: &FeatureState,
    command: AddItemsCommand,
) -> Result<Vec<ItemSnapshot>, AddItemsError> {
    let mut added = Vec::with_capacity(command.items.len());
    for (index, item) in command.items.into_iter().enumerate() {
        let snapshot = add::handle(state, item)
            .await
            .map_err(|e| BatchError::new(index, e))?;
        added.push(snapshot);
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestContext, TestItem};
    use crate::features::shared::{Failure, FailureKind};

    #[tokio::test]
    async fn test_add_items_in_order() {
        let ctx = TestContext::new();
        let command = AddItemsCommand {
            items: vec![
                TestItem::new("A", "Alpha").command(),
                TestItem::new("B", "Beta").command(),
            ],
        };
        let added = handle(&ctx.state, command).await.unwrap();
        let codes: Vec<_> = added.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_duplicate_within_batch_short_circuits() {
        let ctx = TestContext::new();
        let command = AddItemsCommand {
            items: vec![
                TestItem::new("A", "Alpha").command(),
                TestItem::new("A", "Again").command(),
                TestItem::new("C", "Gamma").command(),
            ],
        };
        let err = handle(&ctx.state, command).await.unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.failure_kind(), Some(FailureKind::DuplicateCode));

        // First element committed, third never ran
        let codes: Vec<_> = ctx
            .state
            .store
            .list_item_snapshots(&Default::default())
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.code)
            .collect();
        assert_eq!(codes, vec!["A".to_string()]);
    }
}
