use crate::errors::directory_error::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Could not open group directory: {0}")]
    Directory(#[from] DirectoryError),
    #[error("Could not bind HTTP server: {0}")]
    Bind(#[from] std::io::Error),
}
