//! In-process implementation of [`InventoryStore`]
//!
//! Every table is an append-only `Vec` whose position gives the row id
//! (`id = index + 1`). History tables additionally keep an index from the
//! logical key to the positions of its versions in insertion order, so the
//! current version is always the last entry of that list.
//!
//! All state sits behind one [`RwLock`]; writers hold it for the whole
//! operation, which makes insert-or-get of lookups and the unique code check
//! atomic.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use stockroom_common::types::{ChildKey, SortDirection};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{InventoryStore, StoreError, StoreResult};
use crate::models::{
    ChildFilter, ChildHistory, ChildSnapshot, Course, Item, ItemFilter, ItemHistory, ItemId,
    ItemSnapshot, NewChildHistory, NewItem, NewItemHistory, Room, SortColumn, SortKey, User,
};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    courses: Vec<Course>,
    rooms: Vec<Room>,
    items: Vec<Item>,
    item_histories: Vec<ItemHistory>,
    item_versions: HashMap<ItemId, Vec<usize>>,
    child_histories: Vec<ChildHistory>,
    child_versions: BTreeMap<ChildKey, Vec<usize>>,
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len + 1).unwrap_or(i32::MAX)
}

fn index_of(id: i32) -> Option<usize> {
    usize::try_from(id).ok()?.checked_sub(1)
}

impl State {
    fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(index_of(id)?)
    }

    fn user_name(&self, id: i32) -> Option<&str> {
        index_of(id)
            .and_then(|i| self.users.get(i))
            .map(|u| u.name.as_str())
    }

    fn course_name(&self, id: i32) -> Option<&str> {
        index_of(id)
            .and_then(|i| self.courses.get(i))
            .map(|c| c.name.as_str())
    }

    fn room_number(&self, id: i32) -> Option<i32> {
        index_of(id).and_then(|i| self.rooms.get(i)).map(|r| r.number)
    }

    fn current_item_history(&self, item_id: ItemId) -> Option<&ItemHistory> {
        let last = *self.item_versions.get(&item_id)?.last()?;
        self.item_histories.get(last)
    }

    fn snapshot(&self, item: &Item) -> Option<ItemSnapshot> {
        let history = self.current_item_history(item.id)?;
        Some(ItemSnapshot {
            id: item.id,
            code: item.code.clone(),
            name: item.name.clone(),
            amount: item.amount,
            admin_id: item.admin_id,
            admin: self.user_name(item.admin_id)?.to_string(),
            course_id: item.course_id,
            course: self.course_name(item.course_id)?.to_string(),
            purchased_at: item.purchased_at,
            created_at: item.created_at,
            deleted_at: item.deleted_at,
            history_id: history.id,
            room_id: history.room_id,
            room: history.room,
            seal: history.seal.clone(),
            checked_at: history.checked_at,
            disposal_at: history.disposal_at,
            depreciation_at: history.depreciation_at,
            updated_at: history.created_at,
        })
    }

    fn child_snapshot(&self, row: &ChildHistory) -> Option<ChildSnapshot> {
        let item = self.item(row.item_id)?;
        Some(ChildSnapshot {
            history_id: row.id,
            item_id: row.item_id,
            child_id: row.child_id,
            name: row.name.clone(),
            item_name: item.name.clone(),
            code: item.code.clone(),
            room_id: row.room_id,
            room: row.room,
            checked_at: row.checked_at,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
            item_deleted_at: item.deleted_at,
        })
    }

    fn push_child(&mut self, row: ChildHistory) -> ChildHistory {
        let position = self.child_histories.len();
        self.child_versions.entry(row.key()).or_default().push(position);
        self.child_histories.push(row.clone());
        row
    }
}

/// Numeric sort key of one column; `None` for an unset date
fn sort_value(snapshot: &ItemSnapshot, column: SortColumn) -> Option<i64> {
    let day = |date: Option<NaiveDate>| date.map(|d| i64::from(d.num_days_from_ce()));
    match column {
        SortColumn::Id => Some(i64::from(snapshot.id)),
        SortColumn::Amount => Some(i64::from(snapshot.amount)),
        SortColumn::PurchasedAt => day(Some(snapshot.purchased_at)),
        SortColumn::CheckedAt => day(snapshot.checked_at),
        SortColumn::DisposalAt => day(snapshot.disposal_at),
        SortColumn::DepreciationAt => day(snapshot.depreciation_at),
    }
}

/// NULL compares greater than any value, as in PostgreSQL
fn compare_nullable(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

fn compare_snapshots(a: &ItemSnapshot, b: &ItemSnapshot, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = compare_nullable(sort_value(a, key.column), sort_value(b, key.column));
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.id.cmp(&b.id)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn upsert_user(&self, name: &str) -> StoreResult<i32> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter().find(|u| u.name == name) {
            return Ok(user.id);
        }
        let id = next_id(state.users.len());
        state.users.push(User {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn upsert_course(&self, name: &str) -> StoreResult<i32> {
        let mut state = self.state.write().await;
        if let Some(course) = state.courses.iter().find(|c| c.name == name) {
            return Ok(course.id);
        }
        let id = next_id(state.courses.len());
        state.courses.push(Course {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn upsert_room(&self, number: i32) -> StoreResult<i32> {
        let mut state = self.state.write().await;
        if let Some(room) = state.rooms.iter().find(|r| r.number == number) {
            return Ok(room.id);
        }
        let id = next_id(state.rooms.len());
        state.rooms.push(Room { id, number });
        Ok(id)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.users.clone())
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(self.state.read().await.courses.clone())
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        Ok(self.state.read().await.rooms.clone())
    }

    #[instrument(skip(self, item), fields(code = %item.code))]
    async fn insert_item(&self, item: NewItem) -> StoreResult<Item> {
        let mut state = self.state.write().await;
        if state.items.iter().any(|i| i.code == item.code) {
            return Err(StoreError::UniqueViolation("items_unique_code".to_string()));
        }
        let row = Item {
            id: next_id(state.items.len()),
            code: item.code,
            name: item.name,
            amount: item.amount,
            admin_id: item.admin_id,
            course_id: item.course_id,
            purchased_at: item.purchased_at,
            created_at: item.created_at.unwrap_or_else(Utc::now),
            deleted_at: None,
        };
        state.items.push(row.clone());
        Ok(row)
    }

    async fn find_item(&self, id: ItemId, include_deleted: bool) -> StoreResult<Option<Item>> {
        let state = self.state.read().await;
        Ok(state
            .item(id)
            .filter(|item| include_deleted || !item.is_deleted())
            .cloned())
    }

    async fn soft_delete_items(&self, ids: &[ItemId], at: DateTime<Utc>) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for id in ids {
            let Some(position) = index_of(*id) else { continue };
            if let Some(item) = state.items.get_mut(position) {
                if item.deleted_at.is_none() {
                    item.deleted_at = Some(at);
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn restore_item(&self, id: ItemId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let Some(position) = index_of(id) else {
            return Ok(false);
        };
        match state.items.get_mut(position) {
            Some(item) if item.deleted_at.is_some() => {
                item.deleted_at = None;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    async fn append_item_history(&self, row: NewItemHistory) -> StoreResult<ItemHistory> {
        let mut state = self.state.write().await;
        let room = state
            .room_number(row.room_id)
            .ok_or_else(|| StoreError::UnknownReference(format!("room {}", row.room_id)))?;
        if state.item(row.item_id).is_none() {
            return Err(StoreError::UnknownReference(format!("item {}", row.item_id)));
        }

        let position = state.item_histories.len();
        let history = ItemHistory {
            id: next_id(position),
            item_id: row.item_id,
            room_id: row.room_id,
            room,
            seal: row.seal,
            checked_at: row.checked_at,
            disposal_at: row.disposal_at,
            depreciation_at: row.depreciation_at,
            created_at: Utc::now(),
        };
        state.item_versions.entry(row.item_id).or_default().push(position);
        state.item_histories.push(history.clone());
        debug!(history_id = history.id, "Item history appended");
        Ok(history)
    }

    async fn current_item_history(&self, item_id: ItemId) -> StoreResult<Option<ItemHistory>> {
        Ok(self.state.read().await.current_item_history(item_id).cloned())
    }

    async fn item_histories(&self, item_id: ItemId) -> StoreResult<Vec<ItemHistory>> {
        let state = self.state.read().await;
        let histories = state
            .item_versions
            .get(&item_id)
            .map(|positions| {
                positions
                    .iter()
                    .rev()
                    .filter_map(|p| state.item_histories.get(*p).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(histories)
    }

    async fn item_snapshot(
        &self,
        id: ItemId,
        include_deleted: bool,
    ) -> StoreResult<Option<ItemSnapshot>> {
        let state = self.state.read().await;
        Ok(state
            .item(id)
            .filter(|item| include_deleted || !item.is_deleted())
            .and_then(|item| state.snapshot(item)))
    }

    async fn list_item_snapshots(&self, filter: &ItemFilter) -> StoreResult<Vec<ItemSnapshot>> {
        let state = self.state.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let mut snapshots: Vec<ItemSnapshot> = state
            .items
            .iter()
            .filter(|item| filter.visibility.admits(item.is_deleted()))
            .filter_map(|item| state.snapshot(item))
            .filter(|snap| match needle {
                Some(ref n) => {
                    contains_ci(&snap.name, n)
                        || contains_ci(&snap.code, n)
                        || contains_ci(&snap.admin, n)
                        || contains_ci(&snap.course, n)
                        || snap.room.to_string().contains(n.as_str())
                },
                None => true,
            })
            .collect();

        snapshots.sort_by(|a, b| compare_snapshots(a, b, &filter.sort));
        Ok(snapshots)
    }

    async fn seed_children(
        &self,
        item_id: ItemId,
        amount: i32,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        if state.item(item_id).is_none() {
            return Err(StoreError::UnknownReference(format!("item {}", item_id)));
        }
        let created_at = created_at.unwrap_or_else(Utc::now);
        let mut inserted = 0;
        for child_id in 1..=amount {
            let row = ChildHistory {
                id: next_id(state.child_histories.len()),
                item_id,
                child_id,
                name: None,
                room_id: None,
                room: None,
                checked_at: None,
                created_at,
                deleted_at: None,
            };
            state.push_child(row);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn append_child_history(&self, row: NewChildHistory) -> StoreResult<ChildHistory> {
        let mut state = self.state.write().await;
        if state.item(row.key.item_id).is_none() {
            return Err(StoreError::UnknownReference(format!("item {}", row.key.item_id)));
        }
        let room = match row.room_id {
            Some(room_id) => Some(
                state
                    .room_number(room_id)
                    .ok_or_else(|| StoreError::UnknownReference(format!("room {}", room_id)))?,
            ),
            None => None,
        };
        let history = ChildHistory {
            id: next_id(state.child_histories.len()),
            item_id: row.key.item_id,
            child_id: row.key.child_id,
            name: row.name,
            room_id: row.room_id,
            room,
            checked_at: row.checked_at,
            created_at: row.created_at.unwrap_or_else(Utc::now),
            deleted_at: None,
        };
        Ok(state.push_child(history))
    }

    async fn child_snapshot(
        &self,
        key: ChildKey,
        include_deleted: bool,
    ) -> StoreResult<Option<ChildSnapshot>> {
        let state = self.state.read().await;
        let Some(positions) = state.child_versions.get(&key) else {
            return Ok(None);
        };
        let snapshot = positions
            .iter()
            .rev()
            .filter_map(|p| state.child_histories.get(*p))
            .find(|row| include_deleted || row.deleted_at.is_none())
            .and_then(|row| state.child_snapshot(row));
        Ok(snapshot)
    }

    async fn child_histories(&self, key: ChildKey) -> StoreResult<Vec<ChildHistory>> {
        let state = self.state.read().await;
        let histories = state
            .child_versions
            .get(&key)
            .map(|positions| {
                positions
                    .iter()
                    .rev()
                    .filter_map(|p| state.child_histories.get(*p).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(histories)
    }

    async fn list_child_snapshots(&self, filter: &ChildFilter) -> StoreResult<Vec<ChildSnapshot>> {
        let state = self.state.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let snapshots = state
            .child_versions
            .iter()
            .filter(|(key, _)| filter.item_id.map_or(true, |id| key.item_id == id))
            .filter_map(|(_, positions)| positions.last())
            .filter_map(|p| state.child_histories.get(*p))
            .filter(|row| filter.visibility.admits(row.deleted_at.is_some()))
            .filter_map(|row| state.child_snapshot(row))
            .filter(|snap| match needle {
                Some(ref n) => {
                    contains_ci(snap.display_name(), n)
                        || contains_ci(&snap.code, n)
                        || snap.room.map_or(false, |r| r.to_string().contains(n.as_str()))
                },
                None => true,
            })
            .collect();
        Ok(snapshots)
    }

    async fn soft_delete_children(&self, keys: &[ChildKey], at: DateTime<Utc>) -> StoreResult<u64> {
        let mut guard = self.state.write().await;
        let State {
            child_versions,
            child_histories,
            ..
        } = &mut *guard;

        let mut changed = 0;
        for key in keys {
            for position in child_versions.get(key).into_iter().flatten() {
                if let Some(row) = child_histories.get_mut(*position) {
                    if row.deleted_at.is_none() {
                        row.deleted_at = Some(at);
                        changed += 1;
                    }
                }
            }
        }
        Ok(changed)
    }

    async fn restore_child(&self, key: ChildKey) -> StoreResult<u64> {
        let mut guard = self.state.write().await;
        let State {
            child_versions,
            child_histories,
            ..
        } = &mut *guard;

        let mut touched = 0;
        for position in child_versions.get(&key).into_iter().flatten() {
            if let Some(row) = child_histories.get_mut(*position) {
                row.deleted_at = None;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stockroom_common::types::Visibility;

    async fn seeded_item(store: &MemoryStore, code: &str, amount: i32) -> Item {
        let admin_id = store.upsert_user("Kim").await.unwrap();
        let course_id = store.upsert_course("Physics").await.unwrap();
        let room_id = store.upsert_room(101).await.unwrap();
        let item = store
            .insert_item(NewItem {
                code: code.to_string(),
                name: format!("Item {}", code),
                amount,
                admin_id,
                course_id,
                purchased_at: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                created_at: None,
            })
            .await
            .unwrap();
        store
            .append_item_history(NewItemHistory {
                item_id: item.id,
                room_id,
                seal: None,
                checked_at: None,
                disposal_at: None,
                depreciation_at: None,
            })
            .await
            .unwrap();
        if amount > 1 {
            store.seed_children(item.id, amount, None).await.unwrap();
        }
        item
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.upsert_user("Kim").await.unwrap();
        let second = store.upsert_user("Kim").await.unwrap();
        let other = store.upsert_user("Lee").await.unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(store.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected_even_when_deleted() {
        let store = MemoryStore::new();
        let item = seeded_item(&store, "A-1", 1).await;
        store.soft_delete_items(&[item.id], Utc::now()).await.unwrap();

        let err = store
            .insert_item(NewItem {
                code: "A-1".to_string(),
                name: "Again".to_string(),
                amount: 1,
                admin_id: 1,
                course_id: 1,
                purchased_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                created_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_current_history_is_last_appended() {
        let store = MemoryStore::new();
        let item = seeded_item(&store, "A-1", 1).await;
        let current = store.current_item_history(item.id).await.unwrap().unwrap();

        let mut next = NewItemHistory::carry_forward(&current);
        next.checked_at = NaiveDate::from_ymd_opt(2024, 6, 1);
        store.append_item_history(next).await.unwrap();

        let snapshot = store.item_snapshot(item.id, false).await.unwrap().unwrap();
        assert_eq!(snapshot.checked_at, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(store.item_histories(item.id).await.unwrap().len(), 2);
        assert_eq!(
            store.item_histories(item.id).await.unwrap()[0].id,
            snapshot.history_id
        );
    }

    #[tokio::test]
    async fn test_sort_puts_unset_dates_last_ascending() {
        let store = MemoryStore::new();
        let a = seeded_item(&store, "A", 1).await;
        let b = seeded_item(&store, "B", 1).await;

        let current = store.current_item_history(b.id).await.unwrap().unwrap();
        let mut next = NewItemHistory::carry_forward(&current);
        next.checked_at = NaiveDate::from_ymd_opt(2024, 2, 1);
        store.append_item_history(next).await.unwrap();

        let filter = ItemFilter {
            sort: vec![SortKey {
                column: SortColumn::CheckedAt,
                direction: SortDirection::Asc,
            }],
            ..Default::default()
        };
        let ids: Vec<_> = store
            .list_item_snapshots(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_child_delete_and_restore_touch_every_row() {
        let store = MemoryStore::new();
        let item = seeded_item(&store, "C", 2).await;
        let key = ChildKey::new(item.id, 1);
        store
            .append_child_history(NewChildHistory {
                key,
                name: Some("Left".to_string()),
                room_id: None,
                checked_at: None,
                created_at: None,
            })
            .await
            .unwrap();

        assert_eq!(store.soft_delete_children(&[key], Utc::now()).await.unwrap(), 2);
        assert!(store.child_snapshot(key, false).await.unwrap().is_none());

        let filter = ChildFilter {
            item_id: Some(item.id),
            visibility: Visibility::OnlyDeleted,
            ..Default::default()
        };
        assert_eq!(store.list_child_snapshots(&filter).await.unwrap().len(), 1);

        assert_eq!(store.restore_child(key).await.unwrap(), 2);
        let restored = store.child_snapshot(key, false).await.unwrap().unwrap();
        assert_eq!(restored.name.as_deref(), Some("Left"));
    }
}
