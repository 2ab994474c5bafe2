//! PostgreSQL implementation of [`InventoryStore`]
//!
//! Queries are plain runtime SQLx statements. The listing queries are built
//! with [`QueryBuilder`] because their WHERE and ORDER BY clauses depend on
//! the caller's filter; every value is bound and only whitelisted column
//! names are ever pushed as SQL text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use stockroom_common::types::{ChildKey, SortDirection, Visibility};
use tracing::{debug, instrument};

use super::{InventoryStore, StoreResult};
use crate::models::{
    ChildFilter, ChildHistory, ChildSnapshot, Course, Item, ItemFilter, ItemHistory, ItemId,
    ItemSnapshot, NewChildHistory, NewItem, NewItemHistory, Room, SortColumn, User,
};

const ITEM_COLUMNS: &str = "id, code, name, amount, admin_id, course_id, purchased_at, created_at, deleted_at";

/// Items joined with their newest history row and lookups.
const ITEM_SNAPSHOT_SELECT: &str = r#"
    SELECT i.id, i.code, i.name, i.amount,
           i.admin_id, u.name AS admin,
           i.course_id, c.name AS course,
           i.purchased_at, i.created_at, i.deleted_at,
           h.id AS history_id, h.room_id, r.number AS room, h.seal,
           h.checked_at, h.disposal_at, h.depreciation_at,
           h.created_at AS updated_at
    FROM items i
    JOIN (
        SELECT item_id, MAX(id) AS id
        FROM item_histories
        GROUP BY item_id
    ) latest ON latest.item_id = i.id
    JOIN item_histories h ON h.id = latest.id
    JOIN users u ON u.id = i.admin_id
    JOIN courses c ON c.id = i.course_id
    JOIN rooms r ON r.id = h.room_id
"#;

/// Newest history row per (item_id, child_id), deleted rows included.
const CHILD_SNAPSHOT_SELECT: &str = r#"
    SELECT ch.id AS history_id, ch.item_id, ch.child_id, ch.name,
           i.name AS item_name, i.code,
           ch.room_id, r.number AS room, ch.checked_at,
           ch.created_at, ch.deleted_at, i.deleted_at AS item_deleted_at
    FROM (
        SELECT DISTINCT ON (item_id, child_id) *
        FROM child_histories
        ORDER BY item_id, child_id, id DESC
    ) ch
    JOIN items i ON i.id = ch.item_id
    LEFT JOIN rooms r ON r.id = ch.room_id
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations from `migrations/`
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// LIKE pattern matching `term` literally anywhere in a value
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn sort_sql(column: SortColumn) -> &'static str {
    match column {
        SortColumn::Id => "i.id",
        SortColumn::Amount => "i.amount",
        SortColumn::PurchasedAt => "i.purchased_at",
        SortColumn::CheckedAt => "h.checked_at",
        SortColumn::DisposalAt => "h.disposal_at",
        SortColumn::DepreciationAt => "h.depreciation_at",
    }
}

fn push_visibility(builder: &mut QueryBuilder<'_, Postgres>, column: &str, visibility: Visibility) {
    match visibility {
        Visibility::Normal => {
            builder.push(format!(" AND {} IS NULL", column));
        },
        Visibility::All => {},
        Visibility::OnlyDeleted => {
            builder.push(format!(" AND {} IS NOT NULL", column));
        },
    }
}

/// `AND (a ILIKE p OR b ILIKE p ...)` over the given SQL expressions
fn push_search(builder: &mut QueryBuilder<'_, Postgres>, expressions: &[&str], term: &str) {
    let pattern = contains_pattern(term);
    builder.push(" AND (");
    for (i, expression) in expressions.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*expression);
        builder.push(" ILIKE ");
        builder.push_bind(pattern.clone());
    }
    builder.push(")");
}

#[async_trait]
impl InventoryStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn upsert_user(&self, name: &str) -> StoreResult<i32> {
        // DO UPDATE (not DO NOTHING) so RETURNING yields the existing row too
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn upsert_course(&self, name: &str) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO courses (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn upsert_room(&self, number: i32) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO rooms (number) VALUES ($1)
            ON CONFLICT (number) DO UPDATE SET number = EXCLUDED.number
            RETURNING id
            "#,
        )
        .bind(number)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>("SELECT id, name FROM courses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>("SELECT id, number FROM rooms ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rooms)
    }

    #[instrument(skip(self, item), fields(code = %item.code))]
    async fn insert_item(&self, item: NewItem) -> StoreResult<Item> {
        let sql = format!(
            r#"
            INSERT INTO items (code, name, amount, admin_id, course_id, purchased_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, Item>(&sql)
            .bind(&item.code)
            .bind(&item.name)
            .bind(item.amount)
            .bind(item.admin_id)
            .bind(item.course_id)
            .bind(item.purchased_at)
            .bind(item.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_item(&self, id: ItemId, include_deleted: bool) -> StoreResult<Option<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE id = $1 AND ($2 OR deleted_at IS NULL)",
            ITEM_COLUMNS
        );
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn soft_delete_items(&self, ids: &[ItemId], at: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE items SET deleted_at = $2 WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn restore_item(&self, id: ItemId) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE items SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, row), fields(item_id = row.item_id))]
    async fn append_item_history(&self, row: NewItemHistory) -> StoreResult<ItemHistory> {
        let history = sqlx::query_as::<_, ItemHistory>(
            r#"
            WITH inserted AS (
                INSERT INTO item_histories
                    (item_id, room_id, seal, checked_at, disposal_at, depreciation_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT ins.id, ins.item_id, ins.room_id, r.number AS room, ins.seal,
                   ins.checked_at, ins.disposal_at, ins.depreciation_at, ins.created_at
            FROM inserted ins
            JOIN rooms r ON r.id = ins.room_id
            "#,
        )
        .bind(row.item_id)
        .bind(row.room_id)
        .bind(&row.seal)
        .bind(row.checked_at)
        .bind(row.disposal_at)
        .bind(row.depreciation_at)
        .fetch_one(&self.pool)
        .await?;
        debug!(history_id = history.id, "Item history appended");
        Ok(history)
    }

    async fn current_item_history(&self, item_id: ItemId) -> StoreResult<Option<ItemHistory>> {
        let history = sqlx::query_as::<_, ItemHistory>(
            r#"
            SELECT h.id, h.item_id, h.room_id, r.number AS room, h.seal,
                   h.checked_at, h.disposal_at, h.depreciation_at, h.created_at
            FROM item_histories h
            JOIN rooms r ON r.id = h.room_id
            WHERE h.item_id = $1
            ORDER BY h.id DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(history)
    }

    async fn item_histories(&self, item_id: ItemId) -> StoreResult<Vec<ItemHistory>> {
        let histories = sqlx::query_as::<_, ItemHistory>(
            r#"
            SELECT h.id, h.item_id, h.room_id, r.number AS room, h.seal,
                   h.checked_at, h.disposal_at, h.depreciation_at, h.created_at
            FROM item_histories h
            JOIN rooms r ON r.id = h.room_id
            WHERE h.item_id = $1
            ORDER BY h.id DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(histories)
    }

    async fn item_snapshot(
        &self,
        id: ItemId,
        include_deleted: bool,
    ) -> StoreResult<Option<ItemSnapshot>> {
        let mut builder = QueryBuilder::<Postgres>::new(ITEM_SNAPSHOT_SELECT);
        builder.push(" WHERE i.id = ").push_bind(id);
        if !include_deleted {
            builder.push(" AND i.deleted_at IS NULL");
        }
        let snapshot = builder
            .build_query_as::<ItemSnapshot>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn list_item_snapshots(&self, filter: &ItemFilter) -> StoreResult<Vec<ItemSnapshot>> {
        let mut builder = QueryBuilder::<Postgres>::new(ITEM_SNAPSHOT_SELECT);
        builder.push(" WHERE TRUE");
        push_visibility(&mut builder, "i.deleted_at", filter.visibility);

        if let Some(ref term) = filter.search {
            push_search(
                &mut builder,
                &["i.name", "i.code", "u.name", "c.name", "CAST(r.number AS TEXT)"],
                term,
            );
        }

        builder.push(" ORDER BY ");
        for key in &filter.sort {
            builder.push(sort_sql(key.column));
            builder.push(" ");
            builder.push(key.direction.as_sql());
            // Match the memory store: NULL sorts as the greatest value
            builder.push(match key.direction {
                SortDirection::Asc => " NULLS LAST, ",
                SortDirection::Desc => " NULLS FIRST, ",
            });
        }
        builder.push("i.id ASC");

        let snapshots = builder
            .build_query_as::<ItemSnapshot>()
            .fetch_all(&self.pool)
            .await?;
        debug!(count = snapshots.len(), "Listed item snapshots");
        Ok(snapshots)
    }

    #[instrument(skip(self))]
    async fn seed_children(
        &self,
        item_id: ItemId,
        amount: i32,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO child_histories (item_id, child_id, created_at)
            SELECT $1, g, COALESCE($3, NOW())
            FROM generate_series(1, $2) AS g
            "#,
        )
        .bind(item_id)
        .bind(amount)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, row), fields(child = %row.key))]
    async fn append_child_history(&self, row: NewChildHistory) -> StoreResult<ChildHistory> {
        let history = sqlx::query_as::<_, ChildHistory>(
            r#"
            WITH inserted AS (
                INSERT INTO child_histories (item_id, child_id, name, room_id, checked_at, created_at)
                VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
                RETURNING *
            )
            SELECT ins.id, ins.item_id, ins.child_id, ins.name, ins.room_id,
                   r.number AS room, ins.checked_at, ins.created_at, ins.deleted_at
            FROM inserted ins
            LEFT JOIN rooms r ON r.id = ins.room_id
            "#,
        )
        .bind(row.key.item_id)
        .bind(row.key.child_id)
        .bind(&row.name)
        .bind(row.room_id)
        .bind(row.checked_at)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(history)
    }

    async fn child_snapshot(
        &self,
        key: ChildKey,
        include_deleted: bool,
    ) -> StoreResult<Option<ChildSnapshot>> {
        let snapshot = sqlx::query_as::<_, ChildSnapshot>(
            r#"
            SELECT ch.id AS history_id, ch.item_id, ch.child_id, ch.name,
                   i.name AS item_name, i.code,
                   ch.room_id, r.number AS room, ch.checked_at,
                   ch.created_at, ch.deleted_at, i.deleted_at AS item_deleted_at
            FROM child_histories ch
            JOIN items i ON i.id = ch.item_id
            LEFT JOIN rooms r ON r.id = ch.room_id
            WHERE ch.item_id = $1 AND ch.child_id = $2
              AND ($3 OR ch.deleted_at IS NULL)
            ORDER BY ch.id DESC
            LIMIT 1
            "#,
        )
        .bind(key.item_id)
        .bind(key.child_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await?;
        Ok(snapshot)
    }

    async fn child_histories(&self, key: ChildKey) -> StoreResult<Vec<ChildHistory>> {
        let histories = sqlx::query_as::<_, ChildHistory>(
            r#"
            SELECT ch.id, ch.item_id, ch.child_id, ch.name, ch.room_id,
                   r.number AS room, ch.checked_at, ch.created_at, ch.deleted_at
            FROM child_histories ch
            LEFT JOIN rooms r ON r.id = ch.room_id
            WHERE ch.item_id = $1 AND ch.child_id = $2
            ORDER BY ch.id DESC
            "#,
        )
        .bind(key.item_id)
        .bind(key.child_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(histories)
    }

    #[instrument(skip(self))]
    async fn list_child_snapshots(&self, filter: &ChildFilter) -> StoreResult<Vec<ChildSnapshot>> {
        let mut builder = QueryBuilder::<Postgres>::new(CHILD_SNAPSHOT_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(item_id) = filter.item_id {
            builder.push(" AND ch.item_id = ").push_bind(item_id);
        }
        push_visibility(&mut builder, "ch.deleted_at", filter.visibility);

        if let Some(ref term) = filter.search {
            push_search(
                &mut builder,
                &["COALESCE(ch.name, i.name)", "i.code", "CAST(r.number AS TEXT)"],
                term,
            );
        }

        builder.push(" ORDER BY ch.item_id ASC, ch.child_id ASC");

        let snapshots = builder
            .build_query_as::<ChildSnapshot>()
            .fetch_all(&self.pool)
            .await?;
        Ok(snapshots)
    }

    #[instrument(skip(self, keys), fields(count = keys.len()))]
    async fn soft_delete_children(&self, keys: &[ChildKey], at: DateTime<Utc>) -> StoreResult<u64> {
        let item_ids: Vec<i32> = keys.iter().map(|k| k.item_id).collect();
        let child_ids: Vec<i32> = keys.iter().map(|k| k.child_id).collect();

        let result = sqlx::query(
            r#"
            UPDATE child_histories SET deleted_at = $3
            WHERE deleted_at IS NULL
              AND (item_id, child_id) IN (
                  SELECT * FROM UNNEST($1::INTEGER[], $2::INTEGER[])
              )
            "#,
        )
        .bind(&item_ids)
        .bind(&child_ids)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(child = %key))]
    async fn restore_child(&self, key: ChildKey) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE child_histories SET deleted_at = NULL WHERE item_id = $1 AND child_id = $2",
        )
        .bind(key.item_id)
        .bind(key.child_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Desk"), "%Desk%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\tmp"), "%c:\\\\tmp%");
    }

    #[test]
    fn test_sort_sql_targets_history_for_dates() {
        assert_eq!(sort_sql(SortColumn::Id), "i.id");
        assert_eq!(sort_sql(SortColumn::PurchasedAt), "i.purchased_at");
        assert_eq!(sort_sql(SortColumn::CheckedAt), "h.checked_at");
        assert_eq!(sort_sql(SortColumn::DepreciationAt), "h.depreciation_at");
    }

    #[test]
    fn test_list_sql_shape() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM items i WHERE TRUE");
        push_visibility(&mut builder, "i.deleted_at", Visibility::OnlyDeleted);
        push_search(&mut builder, &["i.name", "i.code"], "desk");
        let sql = builder.sql();
        assert!(sql.contains("AND i.deleted_at IS NOT NULL"));
        assert!(sql.contains("(i.name ILIKE $1 OR i.code ILIKE $2)"));
    }
}
