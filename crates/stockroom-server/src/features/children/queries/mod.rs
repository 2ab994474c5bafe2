pub mod get;
pub mod histories;
pub mod list;

pub use get::{GetChildError, GetChildQuery};
pub use histories::{ChildHistoriesError, ChildHistoriesQuery};
pub use list::{ListChildrenError, ListChildrenQuery};
