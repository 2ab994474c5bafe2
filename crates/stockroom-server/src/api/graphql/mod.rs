//! GraphQL schema of the inventory API
//!
//! Resolvers hold no logic of their own: each one converts its arguments
//! into a feature command or query and dispatches it through
//! [`crate::cqrs::middleware`].

pub mod inputs;
pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Schema};

use crate::features::FeatureState;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type StockroomSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with `state` available to every resolver
pub fn build_schema(state: FeatureState) -> StockroomSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}
