mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use bistro_auth::Capability;
use bistro_types::models::Role;

use common::{register, send, services};

#[tokio::test]
async fn register_returns_created_identity() {
    let s = services();
    let body = register(&s, "alice", "pw1", None).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "member");
    assert!(body["user"]["id"].as_i64().is_some());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_username_conflicts_regardless_of_password_or_role() {
    let s = services();
    register(&s, "alice", "pw1", None).await;

    for (password, role) in [("pw1", None), ("other", Some("admin")), ("x", Some("member"))] {
        let mut body = json!({ "username": "alice", "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        let (status, value) = send(&s.auth, Method::POST, "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(value["message"], "username already exists");
    }
}

#[tokio::test]
async fn unknown_role_is_coerced_to_member() {
    let s = services();
    let body = register(&s, "carol", "pw", Some("superuser")).await;
    assert_eq!(body["user"]["role"], "member");

    let admin = register(&s, "bob", "pw", Some("admin")).await;
    assert_eq!(admin["user"]["role"], "admin");
}

#[tokio::test]
async fn missing_fields_are_validation_errors() {
    let s = services();
    for body in [
        json!({ "username": "alice" }),
        json!({ "password": "pw" }),
        json!({ "username": "   ", "password": "pw" }),
    ] {
        let (status, value) = send(&s.auth, Method::POST, "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["status"], "error");
    }

    let (status, value) = send(&s.auth, Method::POST, "/register", None, Some(json!("nope"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["message"], "invalid payload");
}

#[tokio::test]
async fn login_token_carries_identity_and_role() {
    let s = services();
    let created = register(&s, "alice", "pw1", None).await;

    let (status, value) = send(
        &s.auth,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["role"], "member");

    let principal = s
        .validator
        .validate(value["token"].as_str().unwrap(), Capability::Any)
        .unwrap();
    assert_eq!(principal.role, Role::Member);
    assert_eq!(principal.subject_id, created["user"]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let s = services();
    register(&s, "alice", "pw1", None).await;

    let (wrong_status, wrong_body) = send(
        &s.auth,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &s.auth,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "mallory", "password": "pw1" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "invalid credentials");
}

#[tokio::test]
async fn ping_answers() {
    let s = services();
    let (status, value) = send(&s.auth, Method::GET, "/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["message"], "auth ok");
}
