//! Test fixtures for feature handlers
//!
//! Handlers run against a fresh [`MemoryStore`] and a seal directory inside
//! a temporary directory that lives as long as the [`TestContext`].
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::new();
//! let desk = TestItem::new("D-1", "Desk").with_amount(3).insert(&ctx.state).await;
//! ```

use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::features::items::commands::add::{self, AddItemCommand};
use crate::features::FeatureState;
use crate::models::ItemSnapshot;
use crate::storage::{SealStorage, SealUpload};
use crate::store::MemoryStore;

pub struct TestContext {
    pub state: FeatureState,
    pub dir: TempDir,
}

impl TestContext {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let seals = SealStorage::new(dir.path().join("seal"));
        Self {
            state: FeatureState::new(Arc::new(MemoryStore::new()), seals),
            dir,
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// An upload backed by an anonymous temp file
pub async fn upload(filename: &str, mime: &str, body: &[u8]) -> SealUpload {
    let mut file = File::from_std(tempfile::tempfile().expect("create temp file"));
    file.write_all(body).await.expect("write upload");
    file.flush().await.expect("flush upload");
    SealUpload::new(filename, Some(mime.to_string()), file)
}

/// Builder for an item added through the real `addItem` handler
#[derive(Debug, Clone)]
pub struct TestItem {
    pub code: String,
    pub name: String,
    pub amount: i32,
    pub admin: String,
    pub course: String,
    pub room: i32,
    pub purchased_at: NaiveDate,
}

impl TestItem {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            amount: 1,
            admin: "Al".to_string(),
            course: "CS".to_string(),
            room: 12,
            purchased_at: date(2020, 1, 1),
        }
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_admin(mut self, admin: &str) -> Self {
        self.admin = admin.to_string();
        self
    }

    pub fn with_room(mut self, room: i32) -> Self {
        self.room = room;
        self
    }

    pub fn command(&self) -> AddItemCommand {
        AddItemCommand {
            code: self.code.clone(),
            name: self.name.clone(),
            amount: self.amount,
            admin: self.admin.clone(),
            course: self.course.clone(),
            room: self.room,
            purchased_at: self.purchased_at,
            checked_at: None,
            disposal_at: None,
            depreciation_at: None,
            created_at: None,
            seal: None,
        }
    }

    pub async fn insert(&self, state: &FeatureState) -> ItemSnapshot {
        add::handle(state, self.command()).await.expect("add test item")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builder() {
        let item = TestItem::new("D-1", "Desk").with_amount(3).with_room(7);
        assert_eq!(item.amount, 3);
        assert_eq!(item.room, 7);
        assert_eq!(item.command().code, "D-1");
    }
}
