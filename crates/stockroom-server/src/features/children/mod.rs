//! Numbered sub-units of multi-unit items
//!
//! A child is identified by `(item_id, child_id)`, written externally as
//! `"<itemId>,<childId>"`. Children are seeded when an item is added and
//! versioned independently of their parent; deleting a child does not
//! delete the item and vice versa.

pub mod commands;
pub mod queries;
