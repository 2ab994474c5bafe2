//! Insert-or-get of lookup identities

use std::fmt;
use tracing::instrument;

use crate::store::{InventoryStore, StoreResult};

/// A natural key of one lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity<'a> {
    Admin(&'a str),
    Course(&'a str),
    Room(i32),
}

impl fmt::Display for Identity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Admin(name) => write!(f, "admin '{}'", name),
            Identity::Course(name) => write!(f, "course '{}'", name),
            Identity::Room(number) => write!(f, "room {}", number),
        }
    }
}

/// Id of the identity, created on first use
///
/// Idempotent: resolving the same key twice yields the same id, also under
/// concurrent callers, since the store performs the insert-or-get atomically.
#[instrument(skip(store), fields(identity = %identity))]
pub async fn resolve(store: &dyn InventoryStore, identity: Identity<'_>) -> StoreResult<i32> {
    let id = match identity {
        Identity::Admin(name) => store.upsert_user(name).await?,
        Identity::Course(name) => store.upsert_course(name).await?,
        Identity::Room(number) => store.upsert_room(number).await?,
    };
    tracing::debug!(id, "Identity resolved");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let store = MemoryStore::new();
        let first = resolve(&store, Identity::Admin("Al")).await.unwrap();
        let again = resolve(&store, Identity::Admin("Al")).await.unwrap();
        assert_eq!(first, again);

        let room = resolve(&store, Identity::Room(12)).await.unwrap();
        assert_eq!(resolve(&store, Identity::Room(12)).await.unwrap(), room);
        assert_eq!(store.list_rooms().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_kinds_are_separate_tables() {
        let store = MemoryStore::new();
        resolve(&store, Identity::Admin("CS")).await.unwrap();
        resolve(&store, Identity::Course("CS")).await.unwrap();
        assert_eq!(store.list_users().await.unwrap().len(), 1);
        assert_eq!(store.list_courses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolve_converges() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    resolve(store.as_ref(), Identity::Course("Physics")).await.unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.list_courses().await.unwrap().len(), 1);
    }
}
