use config::Config;
use directory::DatabaseDirectory;
use errors::server_error::ServerError;
use log::info;
use registry::RaidTracker;
use std::sync::Arc;

pub mod config;
pub mod directory;
pub mod errors;
mod http;
pub mod models;
pub mod registry;
pub mod schema;

pub use http::router;

/// Opens the group directory, starts the sweeper and serves HTTP
pub async fn listen(config: Config) -> Result<(), ServerError> {
    let directory = DatabaseDirectory::open(&config.database_url)?;
    info!("Opened group directory at {}", config.database_url);

    let tracker = Arc::new(RaidTracker::new(Arc::new(directory)));
    tokio::spawn(tracker.sweeper(config.idle_timeout).run(config.sweep_interval));
    info!(
        "Reclaiming sessions idle for {}s every {}s",
        config.idle_timeout.num_seconds(),
        config.sweep_interval.as_secs()
    );

    let app = router(tracker, config.frontend_url.clone());
    http::listen(app, config.port).await?;
    Ok(())
}
