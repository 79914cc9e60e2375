use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use roomkey::{backend::SqliteBackend, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

async fn app() -> Router {
    let backend = SqliteBackend::connect("sqlite::memory:").await.unwrap();
    roomkey::router(AppState::new(backend))
        .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(app: &Router, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply { status, cookie, body }
}

async fn register(app: &Router, device_key: &str, name: &str) -> String {
    let reply = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "device_key": device_key, "display_name": name })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["stage"], "no_rooms");
    reply.cookie.unwrap()
}

#[tokio::test]
async fn unknown_device_is_asked_to_register() {
    let app = app().await;

    let reply = send(&app, Method::POST, "/login", None, Some(json!({ "device_key": "abc-123" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["stage"], "needs_registration");
    assert_eq!(reply.body["device_key"], "abc-123");
    assert!(reply.cookie.is_none());
}

#[tokio::test]
async fn registered_device_creates_and_lists_rooms() {
    let app = app().await;
    let cookie = register(&app, "abc-123", "Alice").await;

    let reply = send(&app, Method::GET, "/r", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["stage"], "no_rooms");
    assert_eq!(reply.body["session"]["user"]["display_name"], "Alice");
    assert!(reply.body["session"]["user"].get("device_key").is_none());

    let reply = send(
        &app,
        Method::POST,
        "/r/new",
        Some(&cookie),
        Some(json!({ "room_key": "party1", "room_name": "Friday" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["stage"], "rooms_loaded");
    assert_eq!(reply.body["rooms"][0]["room_key"], "party1");
    assert_eq!(reply.body["rooms"][0]["members"][0]["display_name"], "Alice");

    let reply = send(&app, Method::GET, "/r", Some(&cookie), None).await;
    assert_eq!(reply.body["stage"], "rooms_loaded");
    assert_eq!(reply.body["rooms"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn taken_room_key_is_a_conflict() {
    let app = app().await;
    let cookie = register(&app, "abc-123", "Alice").await;
    let new_room = json!({ "room_key": "party1" });

    let reply = send(&app, Method::POST, "/r/new", Some(&cookie), Some(new_room.clone())).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&app, Method::POST, "/r/new", Some(&cookie), Some(new_room)).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["error"], "duplicate_key");
    assert_eq!(reply.body["retryable"], false);
}

#[tokio::test]
async fn second_device_joins_by_key() {
    let app = app().await;
    let alice = register(&app, "abc-123", "Alice").await;
    send(&app, Method::POST, "/r/new", Some(&alice), Some(json!({ "room_key": "party1" }))).await;
    register(&app, "def-456", "Bob").await;

    let reply = send(&app, Method::POST, "/login", None, Some(json!({ "device_key": "def-456" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["stage"], "no_rooms");
    let bob = reply.cookie.unwrap();

    let reply = send(&app, Method::POST, "/r/join", Some(&bob), Some(json!({ "room_key": "nowhere" }))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "room_not_found");

    let reply = send(&app, Method::POST, "/r/join", Some(&bob), Some(json!({ "room_key": "party1" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["stage"], "rooms_loaded");
    assert_eq!(reply.body["rooms"][0]["members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn room_routes_need_a_login() {
    let app = app().await;

    let reply = send(&app, Method::GET, "/r", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "not_logged_in");

    let reply = send(&app, Method::POST, "/r/new", None, Some(json!({ "room_key": "party1" }))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = app().await;
    let cookie = register(&app, "abc-123", "Alice").await;

    let reply = send(&app, Method::POST, "/logout", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = send(&app, Method::GET, "/r", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "not_logged_in");
}
