//! Current state of every item matching a filter
//!
//! - visibility selects active, deleted or all items
//! - search is a case-insensitive substring match over the item name, code,
//!   admin name, course name and room number; `%` and `_` match literally
//! - sort is a list of `[column, direction]` pairs over a fixed set of
//!   columns, ties broken by id

use mediator::Request;
use stockroom_common::types::{SortDirection, Visibility};

use crate::features::FeatureState;
use crate::models::{normalize_search, ItemFilter, ItemSnapshot, SortColumn, SortKey};
use crate::store::StoreError;

#[derive(Debug, Clone, Default)]
pub struct ListItemsQuery {
    pub search: Option<String>,
    pub sort: Vec<SortKey>,
    pub visibility: Visibility,
}

#[derive(Debug, thiserror::Error)]
pub enum ListItemsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Vec<ItemSnapshot>, ListItemsError>> for ListItemsQuery {}

impl crate::cqrs::middleware::Query for ListItemsQuery {
    const NAME: &'static str = "items";
}

/// Turn raw `[column, direction]` pairs into sort keys
///
/// Pairs naming a column off the whitelist are dropped. The direction is
/// ascending only for exactly `"asc"`; anything else, including a missing
/// direction, sorts descending.
pub fn parse_sort(pairs: &[Vec<String>]) -> Vec<SortKey> {
    pairs
        .iter()
        .filter_map(|pair| {
            let column = SortColumn::from_field(pair.first()?)?;
            let direction = pair
                .get(1)
                .map(|d| SortDirection::from_input(d))
                .unwrap_or(SortDirection::Desc);
            Some(SortKey { column, direction })
        })
        .collect()
}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: &FeatureState,
    query: ListItemsQuery,
) -> Result<Vec<ItemSnapshot>, ListItemsError> {
    let filter = ItemFilter {
        search: normalize_search(query.search.as_deref()),
        sort: query.sort,
        visibility: query.visibility,
    };
    let items = state.store.list_item_snapshots(&filter).await?;
    tracing::debug!(count = items.len(), "Items listed");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::items::commands::edit::{self, EditItemCommand, ItemChanges};
    use crate::features::shared::test_helpers::{date, TestContext, TestItem};

    fn pair(column: &str, direction: &str) -> Vec<String> {
        vec![column.to_string(), direction.to_string()]
    }

    fn ids(items: &[ItemSnapshot]) -> Vec<i32> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_parse_sort_whitelist_and_direction() {
        let keys = parse_sort(&[
            pair("amount", "asc"),
            pair("name", "asc"),
            pair("purchasedAt", "ASC"),
            vec!["checkedAt".to_string()],
            vec![],
        ]);
        assert_eq!(
            keys,
            vec![
                SortKey {
                    column: SortColumn::Amount,
                    direction: SortDirection::Asc
                },
                SortKey {
                    column: SortColumn::PurchasedAt,
                    direction: SortDirection::Desc
                },
                SortKey {
                    column: SortColumn::CheckedAt,
                    direction: SortDirection::Desc
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_search_hit_and_miss() {
        let ctx = TestContext::new();
        TestItem::new("D-1", "Desk").with_amount(3).insert(&ctx.state).await;

        let hit = handle(
            &ctx.state,
            ListItemsQuery {
                search: Some("Desk".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hit.len(), 1);

        let miss = handle(
            &ctx.state,
            ListItemsQuery {
                search: Some("zzz".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn test_search_spans_admin_course_and_room() {
        let ctx = TestContext::new();
        let desk = TestItem::new("D-1", "Desk").with_admin("Kimura").insert(&ctx.state).await;
        let chair = TestItem::new("C-1", "Chair").with_room(404).insert(&ctx.state).await;

        let search = |term: &str| ListItemsQuery {
            search: Some(term.to_string()),
            ..Default::default()
        };

        assert_eq!(ids(&handle(&ctx.state, search("kimu")).await.unwrap()), vec![desk.id]);
        assert_eq!(ids(&handle(&ctx.state, search("40")).await.unwrap()), vec![chair.id]);
        assert_eq!(handle(&ctx.state, search("cs")).await.unwrap().len(), 2);
        assert!(handle(&ctx.state, search("%")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_keeps_whitespace() {
        let ctx = TestContext::new();
        TestItem::new("D-1", "Desk").insert(&ctx.state).await;
        let lamp = TestItem::new("L-1", "Desk lamp").insert(&ctx.state).await;

        let search = |term: &str| ListItemsQuery {
            search: Some(term.to_string()),
            ..Default::default()
        };

        assert_eq!(ids(&handle(&ctx.state, search(" lamp")).await.unwrap()), vec![lamp.id]);
        assert!(handle(&ctx.state, search(" Desk")).await.unwrap().is_empty());
        assert_eq!(ids(&handle(&ctx.state, search(" ")).await.unwrap()), vec![lamp.id]);
        assert_eq!(handle(&ctx.state, search("")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_visibility() {
        let ctx = TestContext::new();
        let a = TestItem::new("A", "Alpha").insert(&ctx.state).await;
        let b = TestItem::new("B", "Beta").insert(&ctx.state).await;
        ctx.state
            .store
            .soft_delete_items(&[b.id], chrono::Utc::now())
            .await
            .unwrap();

        let list = |visibility| ListItemsQuery {
            visibility,
            ..Default::default()
        };
        assert_eq!(ids(&handle(&ctx.state, list(Visibility::Normal)).await.unwrap()), vec![a.id]);
        assert_eq!(
            ids(&handle(&ctx.state, list(Visibility::OnlyDeleted)).await.unwrap()),
            vec![b.id]
        );
        assert_eq!(
            ids(&handle(&ctx.state, list(Visibility::All)).await.unwrap()),
            vec![a.id, b.id]
        );
    }

    #[tokio::test]
    async fn test_sort_by_history_and_identity_columns() {
        let ctx = TestContext::new();
        let small = TestItem::new("S", "Small").insert(&ctx.state).await;
        let large = TestItem::new("L", "Large").with_amount(5).insert(&ctx.state).await;

        let by_amount = handle(
            &ctx.state,
            ListItemsQuery {
                sort: parse_sort(&[pair("amount", "desc")]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(&by_amount), vec![large.id, small.id]);

        edit::handle(
            &ctx.state,
            EditItemCommand {
                id: small.id,
                changes: ItemChanges {
                    checked_at: Some(Some(date(2024, 1, 1))),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        let by_checked = handle(
            &ctx.state,
            ListItemsQuery {
                sort: parse_sort(&[pair("checkedAt", "asc")]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(&by_checked), vec![small.id, large.id]);
    }
}
