//! Common utilities for Stockroom server integration tests
//!
//! Every test gets its own in-memory store and a temporary seal directory,
//! so tests are isolated and need no external services.

#![allow(dead_code)]

use async_graphql::{Request, Variables};
use serde_json::Value;
use std::sync::Arc;
use stockroom_server::{
    api::{build_schema, StockroomSchema},
    features::FeatureState,
    storage::SealStorage,
    store::MemoryStore,
};
use tempfile::TempDir;

pub struct TestApp {
    pub schema: StockroomSchema,
    pub state: FeatureState,
    /// Holds the seal directory for the lifetime of the test
    pub dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = FeatureState::new(
            Arc::new(MemoryStore::new()),
            SealStorage::new(dir.path().join("seal")),
        );
        Self {
            schema: build_schema(state.clone()),
            state,
            dir,
        }
    }

    /// Execute a request and return its `data`, failing the test on GraphQL errors
    pub async fn run(&self, request: impl Into<Request>) -> Value {
        let response = self.schema.execute(request).await;
        assert!(response.errors.is_empty(), "GraphQL errors: {:?}", response.errors);
        response.data.into_json().expect("Response data is not JSON")
    }

    pub async fn query(&self, query: &str) -> Value {
        self.run(query).await
    }

    pub async fn query_with(&self, query: &str, variables: Value) -> Value {
        self.run(Request::new(query).variables(Variables::from_json(variables)))
            .await
    }

    /// Add an item through the API and return its id
    pub async fn add_item(&self, code: &str, name: &str, amount: i32) -> i64 {
        let data = self
            .query_with(
                ADD_ITEM,
                serde_json::json!({ "data": item_input(code, name, amount) }),
            )
            .await;
        assert_eq!(data["addItem"]["success"], true, "addItem failed: {}", data);
        data["addItem"]["item"]["id"].as_i64().expect("item id")
    }
}

pub const ADD_ITEM: &str = r#"
    mutation AddItem($data: AddItemInput!) {
        addItem(data: $data) {
            success
            message
            code
            item { id code name amount admin course room seal }
        }
    }
"#;

/// A complete `AddItemInput` with fixed admin, course, room and purchase date
pub fn item_input(code: &str, name: &str, amount: i32) -> Value {
    serde_json::json!({
        "code": code,
        "name": name,
        "amount": amount,
        "admin": "Sato",
        "course": "Robotics",
        "room": 301,
        "purchasedAt": "2020-04-01",
        "seal": null,
    })
}
