use async_graphql::{Context, Object};

use super::types::{ChildEnum, ChildItem, Course, Item, ItemEnum, Room, User};
use crate::cqrs::middleware::send_query;
use crate::features::children::queries::{
    get as child_get, list as child_list, GetChildQuery, ListChildrenQuery,
};
use crate::features::export::queries::{csv, ExportCsvQuery};
use crate::features::items::queries::{
    get as item_get, list as item_list, parse_sort, GetItemQuery, ListItemsQuery,
};
use crate::features::lookups::queries::{
    list as lookups, ListCoursesQuery, ListRoomsQuery, ListUsersQuery,
};
use crate::features::FeatureState;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Current state of every item matching the search, in the requested order
    ///
    /// `sort` is a list of `[column, direction]` pairs.
    async fn items(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] sort: Vec<Vec<String>>,
        search: Option<String>,
        #[graphql(default)] item_enum: ItemEnum,
    ) -> async_graphql::Result<Vec<Item>> {
        let state = ctx.data::<FeatureState>()?;
        let query = ListItemsQuery {
            search,
            sort: parse_sort(&sort),
            visibility: item_enum.into(),
        };
        let rows = send_query(query, |q| item_list::handle(state, q)).await?;
        Ok(rows.into_iter().map(Item).collect())
    }

    /// One item, deleted or not
    async fn item(&self, ctx: &Context<'_>, id: i32) -> async_graphql::Result<Option<Item>> {
        let state = ctx.data::<FeatureState>()?;
        let row = send_query(GetItemQuery { id }, |q| item_get::handle(state, q)).await?;
        Ok(row.map(Item))
    }

    async fn children(
        &self,
        ctx: &Context<'_>,
        item_id: Option<i32>,
        search: Option<String>,
        #[graphql(default)] child_enum: ChildEnum,
    ) -> async_graphql::Result<Vec<ChildItem>> {
        let state = ctx.data::<FeatureState>()?;
        let query = ListChildrenQuery {
            item_id,
            search,
            visibility: child_enum.into(),
        };
        let rows = send_query(query, |q| child_list::handle(state, q)).await?;
        Ok(rows.into_iter().map(ChildItem).collect())
    }

    /// One child by composite id `"<itemId>,<childId>"`
    async fn child(
        &self,
        ctx: &Context<'_>,
        child_id: String,
    ) -> async_graphql::Result<Option<ChildItem>> {
        let state = ctx.data::<FeatureState>()?;
        let row = send_query(GetChildQuery { child_id }, |q| child_get::handle(state, q)).await?;
        Ok(row.map(ChildItem))
    }

    /// Items and children as CSV; deleted rows only when `paranoid` is false
    async fn csv(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = true)] paranoid: bool,
    ) -> async_graphql::Result<String> {
        let state = ctx.data::<FeatureState>()?;
        let query = ExportCsvQuery {
            include_deleted: !paranoid,
        };
        Ok(send_query(query, |q| csv::handle(state, q)).await?)
    }

    async fn users(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<User>> {
        let state = ctx.data::<FeatureState>()?;
        let rows = send_query(ListUsersQuery, |q| lookups::users(state, q)).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn courses(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Course>> {
        let state = ctx.data::<FeatureState>()?;
        let rows = send_query(ListCoursesQuery, |q| lookups::courses(state, q)).await?;
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn rooms(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Room>> {
        let state = ctx.data::<FeatureState>()?;
        let rows = send_query(ListRoomsQuery, |q| lookups::rooms(state, q)).await?;
        Ok(rows.into_iter().map(Room::from).collect())
    }
}
