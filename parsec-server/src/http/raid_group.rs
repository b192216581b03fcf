use super::{Rejection, rejection};
use crate::errors::directory_error::DirectoryError;
use crate::registry::RaidTracker;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use log::error;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RaidGroupParams {
    name: String,
    password: String,
    admin_password: String,
}

/// Runs a blocking directory call off the async workers
async fn with_directory<F, T>(tracker: Arc<RaidTracker>, call: F) -> Result<T, Rejection>
where
    F: FnOnce(&RaidTracker) -> Result<T, DirectoryError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(move || call(&tracker)).await {
        Ok(result) => result.map_err(directory_rejection),
        Err(error) => {
            error!("Group directory task failed: {error}");
            Err(rejection(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Group directory unavailable",
            ))
        }
    }
}

fn directory_rejection(error: DirectoryError) -> Rejection {
    match error {
        DirectoryError::MissingFields
        | DirectoryError::NameTaken
        | DirectoryError::InvalidCredentials => rejection(StatusCode::BAD_REQUEST, error),
        error => {
            error!("{error}");
            rejection(StatusCode::INTERNAL_SERVER_ERROR, "Group directory unavailable")
        }
    }
}

pub(crate) async fn check(
    State(tracker): State<Arc<RaidTracker>>,
    Query(params): Query<RaidGroupParams>,
) -> Result<StatusCode, Rejection> {
    let group_id = with_directory(tracker, move |tracker| {
        tracker
            .directory()
            .authenticate(&params.name, &params.password)
    })
    .await?;

    match group_id {
        Some(_) => Ok(StatusCode::OK),
        None => Err(rejection(
            StatusCode::UNAUTHORIZED,
            "Invalid group name or password",
        )),
    }
}

pub(crate) async fn create(
    State(tracker): State<Arc<RaidTracker>>,
    Query(params): Query<RaidGroupParams>,
) -> Result<Json<String>, Rejection> {
    with_directory(tracker, move |tracker| {
        tracker
            .directory()
            .create(&params.name, &params.password, &params.admin_password)
    })
    .await?;

    Ok(Json(String::from("Raid group created successfully")))
}

pub(crate) async fn delete(
    State(tracker): State<Arc<RaidTracker>>,
    Query(params): Query<RaidGroupParams>,
) -> Result<Json<String>, Rejection> {
    with_directory(tracker, move |tracker| {
        tracker
            .directory()
            .delete(&params.name, &params.admin_password)
    })
    .await?;

    Ok(Json(String::from("Raid group deleted successfully")))
}

pub(crate) async fn unsupported() -> impl IntoResponse {
    rejection(StatusCode::NOT_FOUND, "Unsupported method")
}
