//! Items and their append-only histories
//!
//! An item's identity row is written once; every later change to its room,
//! seal or dates appends an `item_histories` row. The current state of an
//! item is its identity joined with the newest history row.

pub mod commands;
pub mod queries;
