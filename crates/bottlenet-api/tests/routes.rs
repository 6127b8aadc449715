use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use bottlenet_api::{AppStateInner, router};
use bottlenet_core::Engine;
use bottlenet_db::Database;

fn app() -> Router {
    let db = Arc::new(Database::open_in_memory().unwrap());
    router(AppStateInner::new(Engine::new(db, Duration::from_secs(10))))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, name: &str) -> String {
    let (status, user) = send_json(
        app,
        Method::POST,
        "/api/users",
        Some(json!({ "name": name, "email": format!("{name}@example.com") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn hello_and_health() {
    let app = app();

    let (status, body) = send_json(&app, Method::GET, "/api/hello", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello from Bottlenet!");

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn users_round_trip_through_the_api() {
    let app = app();
    let id = register(&app, "TestUser1").await;
    register(&app, "TestUser2").await;

    let (status, users) = send_json(&app, Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], id.as_str());
    assert_eq!(users[0]["email"], "TestUser1@example.com");
    assert_eq!(users[0]["keptMessages"], json!([]));
}

#[tokio::test]
async fn create_user_rejects_missing_fields() {
    let app = app();

    let (status, body) =
        send_json(&app, Method::POST, "/api/users", Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "name": "", "email": "e@x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_message_assigns_a_random_recipient() {
    let app = app();
    let sender = register(&app, "TestUser1").await;
    let other = register(&app, "TestUser2").await;

    let (status, message) = send_json(
        &app,
        Method::POST,
        "/api/messages/new",
        Some(json!({ "senderId": sender, "content": "Message in a bottle" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["content"], "Message in a bottle");
    assert_eq!(message["senderId"], sender.as_str());
    assert_eq!(message["recipientId"], other.as_str());
    assert!(message["timestamp"].as_i64().unwrap() > 0);
    assert!(message["threadId"].is_null());
    assert_eq!(message["id"].as_str().unwrap().len(), 32);
}

#[tokio::test]
async fn create_message_errors_map_to_statuses() {
    let app = app();
    let lonely = register(&app, "solo").await;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/messages/new",
        Some(json!({ "senderId": "nope", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ghost = "0123456789abcdef0123456789abcdef";
    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/messages/new",
        Some(json!({ "senderId": ghost, "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/messages/new",
        Some(json!({ "senderId": lonely, "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "no users available");

    let (status, _) = send(&app, Method::POST, "/api/messages/new", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn respond_inverts_roles_and_threads_the_conversation() {
    let app = app();
    let sender = register(&app, "TestUser1").await;
    let recipient = register(&app, "TestUser2").await;

    let (_, original) = send_json(
        &app,
        Method::POST,
        "/api/messages/new",
        Some(json!({ "senderId": sender, "content": "Initial message" })),
    )
    .await;
    let original_id = original["id"].as_str().unwrap();

    let (status, response) = send_json(
        &app,
        Method::POST,
        &format!("/api/messages/{original_id}/respond"),
        Some(json!({ "content": "Response to the message" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["content"], "Response to the message");
    assert_eq!(response["senderId"], recipient.as_str());
    assert_eq!(response["recipientId"], sender.as_str());

    let (_, original) =
        send_json(&app, Method::GET, &format!("/api/messages/{original_id}"), None).await;
    let thread_id = original["threadId"].as_str().expect("thread linked");

    let (status, thread) =
        send_json(&app, Method::GET, &format!("/api/threads/{thread_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["messages"], json!([original_id, response["id"]]));
}

#[tokio::test]
async fn respond_errors_map_to_statuses() {
    let app = app();

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/messages/not-hex/respond",
        Some(json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/messages/0123456789abcdef0123456789abcdef/respond",
        Some(json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drop_changes_only_the_recipient() {
    let app = app();
    let sender = register(&app, "TestUser1").await;
    register(&app, "TestUser2").await;
    register(&app, "TestUser3").await;

    let (_, original) = send_json(
        &app,
        Method::POST,
        "/api/messages/new",
        Some(json!({ "senderId": sender, "content": "Message to be dropped" })),
    )
    .await;
    let id = original["id"].as_str().unwrap();

    let (status, dropped) =
        send_json(&app, Method::POST, &format!("/api/messages/{id}/drop"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dropped["id"], original["id"]);
    assert_eq!(dropped["content"], original["content"]);
    assert_eq!(dropped["timestamp"], original["timestamp"]);
    assert_ne!(dropped["recipientId"], sender.as_str());

    let (_, stored) = send_json(&app, Method::GET, &format!("/api/messages/{id}"), None).await;
    assert_eq!(stored, dropped);
}

#[tokio::test]
async fn keep_bookmarks_once() {
    let app = app();
    let sender = register(&app, "TestUser1").await;
    let keeper = register(&app, "TestUser2").await;

    let (_, message) = send_json(
        &app,
        Method::POST,
        "/api/messages/new",
        Some(json!({ "senderId": sender, "content": "keep me" })),
    )
    .await;
    let id = message["id"].as_str().unwrap();

    for _ in 0..2 {
        let uri = format!("/api/messages/{id}/keep?userId={keeper}");
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Message successfully kept");
    }

    let (_, users) = send_json(&app, Method::GET, "/api/users", None).await;
    let keeper_entry = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"] == keeper.as_str())
        .unwrap();
    assert_eq!(keeper_entry["keptMessages"], json!([id]));
}

#[tokio::test]
async fn keep_requires_a_valid_user_id() {
    let app = app();
    let id = "0123456789abcdef0123456789abcdef";

    let (status, _) = send(&app, Method::GET, &format!("/api/messages/{id}/keep"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/messages/{id}/keep?userId=bogus");
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
