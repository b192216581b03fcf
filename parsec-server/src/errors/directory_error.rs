use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("All three arguments required to create a raid group")]
    MissingFields,
    #[error("A group with the given name already exists")]
    NameTaken,
    #[error("Invalid group name or admin password")]
    InvalidCredentials,
    #[error("Could not get connection from pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Could not hash password: {0}")]
    Hash(argon2::password_hash::Error),
}
