use super::{Rejection, rejection};
use crate::models::stats_payload::StatsPayload;
use crate::registry::RaidTracker;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;

/// Stores the caller's stats, if sent, and replies with the whole group's.
pub(crate) async fn raid_stats(
    State(tracker): State<Arc<RaidTracker>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<StatsPayload>>, Rejection> {
    let token = headers
        .get(AUTHORIZATION)
        .ok_or(rejection(StatusCode::UNAUTHORIZED, "Invalid token"))?
        .to_str()
        .or(Err(rejection(StatusCode::UNAUTHORIZED, "Invalid token")))?
        .replace("Bearer ", "");

    let payload = if body.is_empty() {
        None
    } else {
        let payload = serde_json::from_slice::<StatsPayload>(&body).map_err(|error| {
            rejection(
                StatusCode::BAD_REQUEST,
                format!("Invalid stats payload: {error}"),
            )
        })?;
        Some(payload)
    };

    tracker
        .push_and_get_stats(&token, payload)
        .map(Json)
        .or(Err(rejection(StatusCode::UNAUTHORIZED, "Invalid token")))
}
