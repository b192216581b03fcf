use crate::errors::directory_error::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid group name or password")]
    Unauthorized,
    #[error("Invalid token")]
    InvalidToken,
    #[error("A session with this token already exists")]
    DuplicateToken,
    #[error("Session not found")]
    NotFound,
    #[error("Could not query group directory: {0}")]
    Directory(#[from] DirectoryError),
}
