use crate::errors::directory_error::DirectoryError;

mod database_directory;

pub use database_directory::DatabaseDirectory;

/// Durable store of raid groups and their password pairs.
pub trait GroupDirectory: Send + Sync {
    /// Registers a new group and returns its id.
    fn create(&self, name: &str, password: &str, admin_password: &str)
    -> Result<i32, DirectoryError>;

    /// Removes the group if `admin_password` matches.
    fn delete(&self, name: &str, admin_password: &str) -> Result<(), DirectoryError>;

    /// The group id if `password` matches, `None` for an unknown group or a
    /// wrong password.
    fn authenticate(&self, name: &str, password: &str) -> Result<Option<i32>, DirectoryError>;
}
