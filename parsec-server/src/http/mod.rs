use crate::registry::RaidTracker;
use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
};
use hyper::{Request, body::Incoming};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server,
};
use log::{error, info};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_service::Service;

mod connect;
mod raid_group;
mod raid_stats;
mod stats;

type Rejection = (StatusCode, Json<String>);

fn rejection(status: StatusCode, message: impl ToString) -> Rejection {
    (status, Json(message.to_string()))
}

/// Routes for group management, client connections and stats exchange
pub fn router(tracker: Arc<RaidTracker>, frontend_url: Option<HeaderValue>) -> Router {
    let api_routes = Router::new()
        .route(
            "/raid_group",
            get(raid_group::check)
                .post(raid_group::create)
                .delete(raid_group::delete)
                .fallback(raid_group::unsupported),
        )
        .route("/connect", post(connect::connect))
        .route("/stats", post(raid_stats::raid_stats));

    let app = Router::new()
        .nest("/api/v2", api_routes)
        .route("/_parsec/stats", get(stats::stats))
        .with_state(tracker);

    match frontend_url {
        Some(origin) => app.layer(CorsLayer::new().allow_origin(origin)),
        None => app,
    }
}

/// Starts the HTTP server with hyper so headers can be served with title case
pub async fn listen(app: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    info!("HTTP server listening on port {port}");

    loop {
        let (socket, _remote_addr) = match listener.accept().await {
            Ok(listener) => listener,
            Err(error) => {
                error!("Could not get socket from accepted HTTP connection: {error}");
                continue;
            }
        };

        let tower_service = app.clone();
        tokio::spawn(async move {
            let socket = TokioIo::new(socket);
            let hyper_service = hyper::service::service_fn(move |request: Request<Incoming>| {
                tower_service.clone().call(request)
            });

            let mut builder = server::conn::auto::Builder::new(TokioExecutor::new());
            builder.http1().title_case_headers(true);

            if let Err(err) = builder
                .serve_connection_with_upgrades(socket, hyper_service)
                .await
            {
                error!("Failed to serve connection: {err:#}");
            }
        });
    }
}
