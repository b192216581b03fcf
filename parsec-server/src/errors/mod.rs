pub mod config_error;
pub mod directory_error;
pub mod registry_error;
pub mod server_error;
