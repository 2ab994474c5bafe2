pub mod list;

pub use list::{
    ListCoursesQuery, ListRoomsQuery, ListUsersQuery, LookupError,
};
