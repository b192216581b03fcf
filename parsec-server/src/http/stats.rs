use crate::registry::RaidTracker;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;

pub(crate) async fn stats(State(tracker): State<Arc<RaidTracker>>) -> impl IntoResponse {
    Json(json!({
        "sessions": tracker.sessions().len(),
        "groups": tracker.groups().len(),
    }))
}
