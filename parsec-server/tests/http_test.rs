use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use parsec_server::directory::DatabaseDirectory;
use parsec_server::registry::RaidTracker;
use parsec_server::router;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raid_groups.db");
    let directory = DatabaseDirectory::open(path.to_str().unwrap()).unwrap();
    let tracker = Arc::new(RaidTracker::new(Arc::new(directory)));
    (dir, router(tracker, None))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn raid_group(method: &str, query: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(format!("/api/v2/raid_group?{query}"))
        .body(Body::empty())
        .unwrap()
}

fn connect(name: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v2/connect")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": name, "password": password }).to_string(),
        ))
        .unwrap()
}

fn push(token: &str, payload: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri("/api/v2/stats")
        .header(AUTHORIZATION, format!("Bearer {token}"));

    let request = match payload {
        Some(payload) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    };
    request.unwrap()
}

async fn token(app: &Router, name: &str, password: &str) -> String {
    let (status, body) = send(app, connect(name, password)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn raid_group_lifecycle() {
    let (_dir, app) = app();

    let (status, body) = send(&app, raid_group("POST", "name=Alpha&password=p&adminPassword=a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Raid group created successfully");

    let (status, body) = send(&app, raid_group("POST", "name=Alpha&password=x&adminPassword=y")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "A group with the given name already exists");

    let (status, _) = send(&app, raid_group("GET", "name=Alpha&password=p")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, raid_group("GET", "name=Alpha&password=wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid group name or password");

    let (status, body) = send(&app, raid_group("DELETE", "name=Alpha&adminPassword=p")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid group name or admin password");

    let (status, body) = send(&app, raid_group("DELETE", "name=Alpha&adminPassword=a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Raid group deleted successfully");

    let (status, _) = send(&app, raid_group("GET", "name=Alpha&password=p")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_requires_all_arguments() {
    let (_dir, app) = app();

    let (status, body) = send(&app, raid_group("POST", "name=Alpha&password=p")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "All three arguments required to create a raid group");
}

#[tokio::test]
async fn unsupported_method_is_not_found() {
    let (_dir, app) = app();

    let (status, body) = send(&app, raid_group("PUT", "name=Alpha")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Unsupported method");
}

#[tokio::test]
async fn connect_with_bad_password_is_unauthorized() {
    let (_dir, app) = app();
    send(&app, raid_group("POST", "name=Alpha&password=p&adminPassword=a")).await;

    let (status, _) = send(&app, connect("Alpha", "nope")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn clients_exchange_stats() {
    let (_dir, app) = app();
    send(&app, raid_group("POST", "name=Alpha&password=p&adminPassword=a")).await;

    let bob = token(&app, "Alpha", "p").await;
    let (status, body) = send(
        &app,
        push(&bob, Some(json!({ "CharacterName": "Bob", "DamageOut": 100 }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["CharacterName"], "Bob");
    assert_eq!(body[0]["DamageOut"], 100);

    let amy = token(&app, "Alpha", "p").await;
    send(
        &app,
        push(&amy, Some(json!({ "CharacterName": "Amy", "DamageOut": 50 }))),
    )
    .await;

    let (status, body) = send(&app, push(&bob, None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|stats| stats["CharacterName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Bob", "Amy"]);

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/_parsec/stats")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sessions": 2, "groups": 1 }));
}

#[tokio::test]
async fn stats_reject_unknown_token() {
    let (_dir, app) = app();

    let (status, body) = send(&app, push("made-up", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid token");
}

#[tokio::test]
async fn stats_reject_malformed_payload() {
    let (_dir, app) = app();
    send(&app, raid_group("POST", "name=Alpha&password=p&adminPassword=a")).await;
    let bob = token(&app, "Alpha", "p").await;

    let (status, _) = send(&app, push(&bob, Some(json!({ "DamageOut": "lots" })))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
