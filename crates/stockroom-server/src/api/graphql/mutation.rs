use async_graphql::{Context, Object};

use super::inputs::{AddItemInput, EditChildInput, EditItemInput};
use super::types::MutationResponse;
use crate::cqrs::middleware::send_command;
use crate::features::children::commands::{
    edit as child_edit, edit_batch as child_edit_batch, remove as child_remove,
    restore as child_restore, EditChildCommand, EditChildrenCommand, RemoveChildrenCommand,
    RestoreChildCommand,
};
use crate::features::items::commands::{
    add, add_batch, edit, edit_batch, remove, restore, AddItemsCommand, EditItemCommand,
    EditItemsCommand, RemoveItemsCommand, RestoreItemCommand,
};
use crate::features::shared::Failure;
use crate::features::FeatureState;

/// Turn a handler result into a mutation response
///
/// Structured failures become `success: false`; anything else is returned
/// as a GraphQL error.
fn respond<T, E>(
    result: Result<T, E>,
    on_success: impl FnOnce(T) -> MutationResponse,
) -> async_graphql::Result<MutationResponse>
where
    E: Failure,
{
    match result {
        Ok(value) => Ok(on_success(value)),
        Err(err) => match err.failure_kind() {
            Some(kind) => Ok(MutationResponse::failure(kind, err.to_string())),
            None => Err(async_graphql::Error::new(err.to_string())),
        },
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn add_item(
        &self,
        ctx: &Context<'_>,
        data: AddItemInput,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let command = data.into_command(ctx)?;
        let result = send_command(command, |c| add::handle(state, c)).await;
        respond(result, |item| MutationResponse::ok().with_item(item))
    }

    /// Add items one by one, stopping at the first failure
    async fn add_items(
        &self,
        ctx: &Context<'_>,
        data: Vec<AddItemInput>,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let items = data
            .into_iter()
            .map(|input| input.into_command(ctx))
            .collect::<async_graphql::Result<Vec<_>>>()?;
        let result = send_command(AddItemsCommand { items }, |c| add_batch::handle(state, c)).await;
        respond(result, |items| MutationResponse::ok().with_items(items))
    }

    async fn edit_item(
        &self,
        ctx: &Context<'_>,
        id: i32,
        data: EditItemInput,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let command = EditItemCommand {
            id,
            changes: data.into_changes(ctx)?,
        };
        let result = send_command(command, |c| edit::handle(state, c)).await;
        respond(result, |item| MutationResponse::ok().with_item(item))
    }

    /// Apply the same edit to every listed item, stopping at the first failure
    async fn edit_items(
        &self,
        ctx: &Context<'_>,
        ids: Vec<i32>,
        data: EditItemInput,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let command = EditItemsCommand {
            ids,
            changes: data.into_changes(ctx)?,
        };
        let result = send_command(command, |c| edit_batch::handle(state, c)).await;
        respond(result, |items| MutationResponse::ok().with_items(items))
    }

    async fn remove_items(
        &self,
        ctx: &Context<'_>,
        ids: Vec<i32>,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let result = send_command(RemoveItemsCommand { ids }, |c| remove::handle(state, c)).await;
        respond(result, |removed| {
            MutationResponse::ok().with_message(format!("{} items removed", removed.removed))
        })
    }

    async fn restore_item(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let result = send_command(RestoreItemCommand { id }, |c| restore::handle(state, c)).await;
        respond(result, |item| MutationResponse::ok().with_item(item))
    }

    async fn edit_child(
        &self,
        ctx: &Context<'_>,
        child_id: String,
        data: EditChildInput,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let command = EditChildCommand {
            child_id,
            changes: data.into(),
        };
        let result = send_command(command, |c| child_edit::handle(state, c)).await;
        respond(result, |child| MutationResponse::ok().with_child(child))
    }

    async fn edit_children(
        &self,
        ctx: &Context<'_>,
        child_ids: Vec<String>,
        data: EditChildInput,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let command = EditChildrenCommand {
            child_ids,
            changes: data.into(),
        };
        let result = send_command(command, |c| child_edit_batch::handle(state, c)).await;
        respond(result, |children| MutationResponse::ok().with_children(children))
    }

    async fn remove_children(
        &self,
        ctx: &Context<'_>,
        child_ids: Vec<String>,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let result = send_command(RemoveChildrenCommand { child_ids }, |c| {
            child_remove::handle(state, c)
        })
        .await;
        respond(result, |removed| {
            MutationResponse::ok().with_message(format!("{} rows removed", removed.removed_rows))
        })
    }

    async fn restore_child(
        &self,
        ctx: &Context<'_>,
        child_id: String,
    ) -> async_graphql::Result<MutationResponse> {
        let state = ctx.data::<FeatureState>()?;
        let result = send_command(RestoreChildCommand { child_id }, |c| {
            child_restore::handle(state, c)
        })
        .await;
        respond(result, |child| MutationResponse::ok().with_child(child))
    }
}
