use super::{Rejection, rejection};
use crate::errors::registry_error::RegistryError;
use crate::registry::RaidTracker;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use log::error;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Deserialize)]
pub(crate) struct Connect {
    name: String,
    password: String,
}

pub(crate) async fn connect(
    State(tracker): State<Arc<RaidTracker>>,
    Json(payload): Json<Connect>,
) -> Result<Json<Value>, Rejection> {
    // Password verification is CPU bound
    let result =
        tokio::task::spawn_blocking(move || tracker.connect(&payload.name, &payload.password))
            .await
            .map_err(|error| {
                error!("Connect task failed: {error}");
                rejection(StatusCode::INTERNAL_SERVER_ERROR, "Could not connect")
            })?;

    match result {
        Ok(token) => Ok(Json(json!({ "token": &*token }))),
        Err(RegistryError::Unauthorized) => Err(rejection(
            StatusCode::UNAUTHORIZED,
            RegistryError::Unauthorized,
        )),
        Err(error) => {
            error!("{error}");
            Err(rejection(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not connect",
            ))
        }
    }
}
