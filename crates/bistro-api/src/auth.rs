use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use tracing::{debug, info};

use bistro_auth::{TokenIssuer, hash_password, verify_password};
use bistro_db::{Database, is_constraint_violation};
use bistro_types::api::{
    LoginRequest, LoginResponse, PingResponse, RegisterRequest, RegisterResponse, UserResponse,
};
use bistro_types::models::Role;

use crate::error::ApiError;

pub type AuthState = Arc<AuthStateInner>;

pub struct AuthStateInner {
    pub db: Arc<Database>,
    pub issuer: TokenIssuer,
}

const INVALID_CREDENTIALS: &str = "invalid credentials";

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/ping", get(ping))
        .with_state(state)
}

pub async fn register(
    State(state): State<AuthState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("username/password required".into()));
    }

    if state
        .db
        .get_user_by_username(&req.username)
        .map_err(|e| ApiError::internal("user lookup failed", e))?
        .is_some()
    {
        return Err(ApiError::Conflict("username already exists".into()));
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await?
        .map_err(|e| ApiError::internal("password hashing failed", e))?;

    let role = Role::sanitize(req.role.as_deref());

    let id = state
        .db
        .create_user(&req.username, &password_hash, role.as_str())
        .map_err(|e| {
            if is_constraint_violation(&e) {
                ApiError::Conflict("username already exists".into())
            } else {
                ApiError::internal("user insert failed", e)
            }
        })?;

    info!("Registered user {} ({}) as {}", req.username, id, role);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "success".into(),
            message: "Registration successful".into(),
            user: UserResponse {
                id,
                username: req.username,
                role,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AuthState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_username(&req.username)
        .map_err(|e| ApiError::internal("user lookup failed", e))?
        .ok_or_else(|| {
            debug!("Login for unknown user {}", req.username);
            ApiError::Authentication(INVALID_CREDENTIALS.into())
        })?;

    let password = req.password;
    let digest = user.password_hash;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &digest)).await?;
    if !verified {
        debug!("Wrong password for user {}", user.username);
        return Err(ApiError::Authentication(INVALID_CREDENTIALS.into()));
    }

    let role = Role::sanitize(Some(&user.role));
    let token = state.issuer.issue(user.id, role)?;

    info!("User {} ({}) logged in", user.username, user.id);
    Ok(Json(LoginResponse { token, role }))
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "auth ok".into(),
    })
}
