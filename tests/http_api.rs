mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "User registered successfully");
    body["id"].as_str().unwrap().to_owned()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn register_login_and_send_flow() {
    let state = test_state().await;
    let app = parley::router(state);

    let alice_id = register(&app, "alice", "wonderland").await;
    let bob_id = register(&app, "bob", "builder").await;
    let token = login(&app, "alice", "wonderland").await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/messages/private",
        Some(&token),
        Some(json!({ "content": "hi", "senderId": alice_id, "recipientId": bob_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Message sent successfully");

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/messages/private/history/{bob_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hi");
    assert_eq!(messages[0]["chatType"], "PRIVATE");
    assert_eq!(messages[0]["senderId"], Value::String(alice_id.clone()));
    assert_eq!(messages[0]["recipientId"], Value::String(bob_id.clone()));
    assert_eq!(messages[0]["groupId"], Value::Null);
    assert!(messages[0]["timestamp"].is_string());
}

#[tokio::test]
async fn register_echoes_the_email_back() {
    let state = test_state().await;
    let app = parley::router(state);

    let (status, body) = call(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({
            "username": "alice",
            "password": "pw",
            "email": "alice@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["email"], "alice@example.com");

    // no email registered means a null echo, not a missing key
    let (status, body) = call(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "bob", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["email"], Value::Null);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let state = test_state().await;
    let app = parley::router(state);

    let (status, _) = call(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "alice", "password": "pw", "email": "a@b.c" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "bob", "password": "pw", "email": "a@b.c" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn blank_email_is_rejected_when_present() {
    let state = test_state().await;
    let app = parley::router(state);

    let (status, body) = call(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "alice", "password": "pw", "email": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email cannot be empty if provided");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let state = test_state().await;
    let app = parley::router(state);

    register(&app, "alice", "pw").await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "alice", "password": "pw2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already registered");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let state = test_state().await;
    let app = parley::router(state);

    register(&app, "alice", "right").await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn protected_endpoints_require_a_principal() {
    let state = test_state().await;
    let app = parley::router(state);

    for (method, uri) in [
        ("POST", "/api/messages/private"),
        ("POST", "/api/messages/group"),
        ("GET", "/api/messages/private/conversation/x"),
        ("GET", "/api/messages/private/history/x"),
        ("GET", "/api/messages/search"),
        ("GET", "/api/users/myInfo"),
    ] {
        let body = if method == "POST" { Some(json!({})) } else { None };
        let (status, value) = call(&app, method, uri, None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(value["error"], "No authenticated user found", "{method} {uri}");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let state = test_state().await;
    let app = parley::router(state);

    let (status, body) = call(&app, "GET", "/api/users/myInfo", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No authenticated user found");
}

#[tokio::test]
async fn group_feed_is_open_and_empty_for_unknown_groups() {
    let state = test_state().await;
    let app = parley::router(state);

    // no token at all and a group id that does not exist
    let (status, body) = call(&app, "GET", "/api/messages/group/nope", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn user_lookup_miss_is_404_unlike_message_paths() {
    let state = test_state().await;
    let app = parley::router(state.clone());

    let (status, body) = call(&app, "GET", "/api/users/ghost", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found: ghost");

    // the same missing user inside a message path is a 400
    let alice_id = register(&app, "alice", "pw").await;
    let token = login(&app, "alice", "pw").await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/messages/private",
        Some(&token),
        Some(json!({ "content": "hi", "senderId": alice_id, "recipientId": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_listing_and_count() {
    let state = test_state().await;
    let app = parley::router(state);

    let alice_id = register(&app, "alice", "pw").await;
    register(&app, "bob", "pw").await;

    let (status, body) = call(&app, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listing = body.as_array().unwrap();
    assert_eq!(listing.len(), 2);
    assert!(listing.iter().any(|u| u["id"] == Value::String(alice_id.clone())));
    assert!(listing.iter().all(|u| u.get("password_hash").is_none()));

    let (status, body) = call(&app, "GET", "/api/users/count", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn my_info_returns_the_principals_id() {
    let state = test_state().await;
    let app = parley::router(state);

    let alice_id = register(&app, "alice", "pw").await;
    let token = login(&app, "alice", "pw").await;

    let (status, body) = call(&app, "GET", "/api/users/myInfo", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], Value::String(alice_id));
}

#[tokio::test]
async fn group_create_and_list() {
    let state = test_state().await;
    let app = parley::router(state);

    let (status, body) = call(
        &app,
        "POST",
        "/api/groups/create",
        None,
        Some(json!({ "name": "general" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Group created successfully");
    let group_id = body["id"].as_str().unwrap().to_owned();

    let (status, body) = call(
        &app,
        "POST",
        "/api/groups/create",
        None,
        Some(json!({ "name": "general" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Group name already exists");

    let (status, body) = call(&app, "GET", "/api/groups", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": group_id, "name": "general" }]));
}

#[tokio::test]
async fn unparsable_search_bounds_are_a_400() {
    let state = test_state().await;
    let app = parley::router(state);

    register(&app, "alice", "pw").await;
    let token = login(&app, "alice", "pw").await;

    let (status, body) = call(
        &app,
        "GET",
        "/api/messages/search?start=garbage",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid 'start' timestamp format: garbage");
}

#[test]
fn engine_errors_map_to_500_and_other_driver_errors_to_400() {
    use parley::error::ApiError;

    let err = ApiError::from(sqlx::Error::Protocol("SQLITE_ERROR: disk I/O error".into()));
    assert!(matches!(err, ApiError::Storage(_)), "{err:?}");
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err = ApiError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, ApiError::Validation(_)), "{err:?}");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn group_feed_answers_500_when_the_table_is_gone() {
    let (state, pool) = test_state_with_pool().await;
    let app = parley::router(state);

    sqlx::raw_sql("DROP TABLE chat_message")
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = call(&app, "GET", "/api/messages/group/g1", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("chat_message"));
}
