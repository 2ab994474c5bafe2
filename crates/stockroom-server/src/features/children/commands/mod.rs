pub mod edit;
pub mod edit_batch;
pub mod remove;
pub mod restore;

pub use edit::{ChildChanges, EditChildCommand, EditChildError};
pub use edit_batch::{EditChildrenCommand, EditChildrenError};
pub use remove::{RemoveChildrenCommand, RemoveChildrenError, RemoveChildrenResponse};
pub use restore::{RestoreChildCommand, RestoreChildError};
