//! CSV export of the current state

pub mod queries;
