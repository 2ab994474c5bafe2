pub mod get;
pub mod histories;
pub mod list;

pub use get::{GetItemError, GetItemQuery};
pub use histories::{ItemHistoriesError, ItemHistoriesQuery};
pub use list::{parse_sort, ListItemsError, ListItemsQuery};
