//! Shared domain types
//!
//! Identifiers and enumerations that appear both in the ledger and at the
//! GraphQL boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StockroomError;

/// Separator between the two halves of an external child id.
pub const CHILD_ID_SEPARATOR: char = ',';

/// Identity of one numbered sub-unit of an item.
///
/// The external form is `"<itemId>,<childId>"`. It is parsed into this typed
/// key at the boundary and never passed around as a string afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChildKey {
    pub item_id: i32,
    pub child_id: i32,
}

impl ChildKey {
    pub fn new(item_id: i32, child_id: i32) -> Self {
        Self { item_id, child_id }
    }
}

impl fmt::Display for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.item_id, CHILD_ID_SEPARATOR, self.child_id)
    }
}

impl FromStr for ChildKey {
    type Err = StockroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || StockroomError::MalformedId(s.to_string());

        let (item, child) = s.split_once(CHILD_ID_SEPARATOR).ok_or_else(malformed)?;
        let item_id = parse_positive(item).ok_or_else(malformed)?;
        let child_id = parse_positive(child).ok_or_else(malformed)?;

        Ok(Self { item_id, child_id })
    }
}

fn parse_positive(part: &str) -> Option<i32> {
    let part = part.trim();
    // i32::from_str accepts a leading '+', which the external form does not
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<i32>().ok().filter(|v| *v > 0)
}

/// Which rows a listing returns with respect to soft-deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Active rows only
    #[default]
    Normal,
    /// Active and soft-deleted rows
    All,
    /// Soft-deleted rows only
    OnlyDeleted,
}

impl Visibility {
    /// Whether a row with the given deletion state passes this filter.
    pub fn admits(self, deleted: bool) -> bool {
        match self {
            Visibility::Normal => !deleted,
            Visibility::All => true,
            Visibility::OnlyDeleted => deleted,
        }
    }
}

impl FromStr for Visibility {
    type Err = StockroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(Visibility::Normal),
            "ALL" => Ok(Visibility::All),
            "ONLY_DELETED" => Ok(Visibility::OnlyDeleted),
            other => Err(StockroomError::InvalidVisibility(other.to_string())),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Normal => write!(f, "NORMAL"),
            Visibility::All => write!(f, "ALL"),
            Visibility::OnlyDeleted => write!(f, "ONLY_DELETED"),
        }
    }
}

/// Sort direction of a listing column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Ascending only for the exact string `"asc"`; anything else sorts descending.
    pub fn from_input(value: &str) -> Self {
        if value == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}
