pub mod add;
pub mod add_batch;
pub mod edit;
pub mod edit_batch;
pub mod remove;
pub mod restore;

pub use add::{AddItemCommand, AddItemError};
pub use add_batch::{AddItemsCommand, AddItemsError};
pub use edit::{EditItemCommand, EditItemError, ItemChanges};
pub use edit_batch::{EditItemsCommand, EditItemsError};
pub use remove::{RemoveItemsCommand, RemoveItemsError, RemoveItemsResponse};
pub use restore::{RestoreItemCommand, RestoreItemError};
