//! Export items and children as one CSV document
//!
//! Items come first, ordered by id, followed by children ordered by
//! `(item_id, child_id)`. Every field is quoted and dates are written as
//! `YYYY-MM-DD`. A child row carries its composite id, its effective name,
//! room and check date, and the parent's code, admin, course and dates; its
//! seal and amount columns are empty.

use chrono::{DateTime, NaiveDate, Utc};
use csv::{QuoteStyle, WriterBuilder};
use mediator::Request;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stockroom_common::types::Visibility;

use crate::features::FeatureState;
use crate::models::{ChildFilter, ChildSnapshot, ItemFilter, ItemId, ItemSnapshot};
use crate::store::StoreError;

pub const CSV_HEADER: [&str; 14] = [
    "id",
    "seal",
    "name",
    "code",
    "amount",
    "admin",
    "course",
    "room",
    "purchasedAt",
    "checkedAt",
    "disposalAt",
    "depreciationAt",
    "createdAt",
    "deletedAt",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportCsvQuery {
    /// Also export deleted items, deleted children and children of deleted items
    pub include_deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportCsvError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to finish CSV output: {0}")]
    Finish(String),
}

impl Request<Result<String, ExportCsvError>> for ExportCsvQuery {}

impl crate::cqrs::middleware::Query for ExportCsvQuery {
    const NAME: &'static str = "csv";
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// UTC calendar day of a timestamp, formatted like the date columns
fn timestamp(value: Option<DateTime<Utc>>) -> String {
    date(value.map(|t| t.date_naive()))
}

fn item_record(item: &ItemSnapshot) -> [String; 14] {
    [
        item.id.to_string(),
        item.seal.clone().unwrap_or_default(),
        item.name.clone(),
        item.code.clone(),
        item.amount.to_string(),
        item.admin.clone(),
        item.course.clone(),
        item.room.to_string(),
        date(Some(item.purchased_at)),
        date(item.checked_at),
        date(item.disposal_at),
        date(item.depreciation_at),
        timestamp(Some(item.created_at)),
        timestamp(item.deleted_at),
    ]
}

fn child_record(child: &ChildSnapshot, parent: Option<&ItemSnapshot>) -> [String; 14] {
    [
        child.key().to_string(),
        String::new(),
        child.display_name().to_string(),
        child.code.clone(),
        String::new(),
        parent.map(|p| p.admin.clone()).unwrap_or_default(),
        parent.map(|p| p.course.clone()).unwrap_or_default(),
        child.room.map(|r| r.to_string()).unwrap_or_default(),
        date(parent.map(|p| p.purchased_at)),
        date(child.checked_at),
        date(parent.and_then(|p| p.disposal_at)),
        date(parent.and_then(|p| p.depreciation_at)),
        timestamp(Some(child.created_at)),
        timestamp(child.deleted_at),
    ]
}

#[tracing::instrument(skip(state))]
pub async fn handle(state: &FeatureState, query: ExportCsvQuery) -> Result<String, ExportCsvError> {
    let visibility = if query.include_deleted {
        Visibility::All
    } else {
        Visibility::Normal
    };
    let store = state.store.as_ref();

    let items = store
        .list_item_snapshots(&ItemFilter {
            visibility,
            ..Default::default()
        })
        .await?;
    let children = store
        .list_child_snapshots(&ChildFilter {
            visibility,
            ..Default::default()
        })
        .await?;

    let parents: HashMap<ItemId, &ItemSnapshot> = items.iter().map(|i| (i.id, i)).collect();

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for item in &items {
        writer.write_record(item_record(item))?;
    }

    let mut child_rows = 0usize;
    for child in &children {
        if !query.include_deleted && child.item_deleted_at.is_some() {
            continue;
        }
        writer.write_record(child_record(child, parents.get(&child.item_id).copied()))?;
        child_rows += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportCsvError::Finish(e.to_string()))?;
    let output = String::from_utf8(bytes).map_err(|e| ExportCsvError::Finish(e.to_string()))?;

    tracing::info!(items = items.len(), children = child_rows, "CSV exported");
    Ok(output)
}
