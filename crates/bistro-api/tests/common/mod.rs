#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use bistro_api::auth::{self, AuthStateInner};
use bistro_api::menu::{self, MenuStateInner};
use bistro_api::orders::{self, OrderStateInner};
use bistro_auth::{AuthConfig, TokenIssuer, TokenValidator};
use bistro_db::Database;
use bistro_orders::{OrderLifecycle, StoreCatalog};

/// The three services wired against one shared in-memory store.
pub struct Services {
    pub auth: Router,
    pub menu: Router,
    pub orders: Router,
    pub db: Arc<Database>,
    pub issuer: TokenIssuer,
    pub validator: Arc<TokenValidator>,
}

pub fn services() -> Services {
    let config = Arc::new(AuthConfig::new("integration-test-secret"));
    let validator = Arc::new(TokenValidator::new(config.clone()));
    let db = Arc::new(Database::open_in_memory().unwrap());

    let auth = auth::router(Arc::new(AuthStateInner {
        db: db.clone(),
        issuer: TokenIssuer::new(config.clone()),
    }));
    let menu = menu::router(Arc::new(MenuStateInner { db: db.clone() }), validator.clone());
    let lifecycle = OrderLifecycle::new(db.clone(), Arc::new(StoreCatalog::new(db.clone())));
    let orders = orders::router(Arc::new(OrderStateInner { lifecycle }), validator.clone());

    Services {
        auth,
        menu,
        orders,
        db,
        issuer: TokenIssuer::new(config),
        validator,
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn register(services: &Services, username: &str, password: &str, role: Option<&str>) -> Value {
    let mut body = serde_json::json!({ "username": username, "password": password });
    if let Some(role) = role {
        body["role"] = Value::from(role);
    }
    let (status, value) = send(&services.auth, Method::POST, "/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "register {username}: {value}");
    value
}

pub async fn login(services: &Services, username: &str, password: &str) -> String {
    let (status, value) = send(
        &services.auth,
        Method::POST,
        "/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {username}: {value}");
    value["token"].as_str().unwrap().to_string()
}

/// Seed a menu item directly in the shared store.
pub fn seed_menu_item(services: &Services, name: &str, price: f64) -> i64 {
    services.db.insert_menu_item(name, "", price).unwrap().id
}
