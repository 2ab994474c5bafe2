//! Listings of the lookup tables, ordered by id

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::shared::{Failure, FailureKind};
use crate::features::FeatureState;
use crate::models::{Course, Room, User};
use crate::store::StoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUsersQuery;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListCoursesQuery;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRoomsQuery;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Failure for LookupError {
    fn failure_kind(&self) -> Option<FailureKind> {
        None
    }
}

impl Request<Result<Vec<User>, LookupError>> for ListUsersQuery {}
impl Request<Result<Vec<Course>, LookupError>> for ListCoursesQuery {}
impl Request<Result<Vec<Room>, LookupError>> for ListRoomsQuery {}

impl crate::cqrs::middleware::Query for ListUsersQuery {
    const NAME: &'static str = "users";
}

impl crate::cqrs::middleware::Query for ListCoursesQuery {
    const NAME: &'static str = "courses";
}

impl crate::cqrs::middleware::Query for ListRoomsQuery {
    const NAME: &'static str = "rooms";
}

#[tracing::instrument(skip(state, _query))]
pub async fn users(state: &FeatureState, _query: ListUsersQuery) -> Result<Vec<User>, LookupError> {
    Ok(state.store.list_users().await?)
}

#[tracing::instrument(skip(state, _query))]
pub async fn courses(
    state: &FeatureState,
    _query: ListCoursesQuery,
) -> Result<Vec<Course>, LookupError> {
    Ok(state.store.list_courses().await?)
}

#[tracing::instrument(skip(state, _query))]
pub async fn rooms(state: &FeatureState, _query: ListRoomsQuery) -> Result<Vec<Room>, LookupError> {
    Ok(state.store.list_rooms().await?)
}
