use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use bistro_types::api::ErrorResponse;

use crate::token::{Capability, Principal, TokenError, TokenValidator};

/// Why a request was turned away at the gate.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    MissingToken,
    Token(TokenError),
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::Token(TokenError::InsufficientRole) => StatusCode::FORBIDDEN,
            AuthRejection::Token(TokenError::SigningError) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthRejection::MissingToken => "missing token",
            AuthRejection::Token(TokenError::TokenExpired) => "token expired",
            AuthRejection::Token(TokenError::MissingRole) => "invalid role",
            AuthRejection::Token(TokenError::InsufficientRole) => "admin only",
            AuthRejection::Token(TokenError::SigningError) => "internal error",
            AuthRejection::Token(_) => "invalid token",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.message()))).into_response()
    }
}

/// One gate, parameterized by the capability it demands.
#[derive(Debug, Clone)]
pub struct Gate {
    validator: Arc<TokenValidator>,
    capability: Capability,
}

impl Gate {
    pub fn new(validator: Arc<TokenValidator>, capability: Capability) -> Self {
        Self {
            validator,
            capability,
        }
    }

    pub fn any(validator: Arc<TokenValidator>) -> Self {
        Self::new(validator, Capability::Any)
    }

    pub fn admin(validator: Arc<TokenValidator>) -> Self {
        Self::new(validator, Capability::Admin)
    }

    pub fn check(&self, headers: &HeaderMap) -> Result<Principal, AuthRejection> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthRejection::MissingToken)?
            .to_str()
            .map_err(|_| AuthRejection::Token(TokenError::MalformedToken))?;

        self.validator
            .validate_header(value, self.capability)
            .map_err(AuthRejection::Token)
    }
}

/// Middleware: validate the bearer token and attach the [`Principal`]
/// to the request for downstream handlers.
pub async fn authorize(
    State(gate): State<Gate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let principal = gate.check(req.headers()).inspect_err(|rejection| {
        debug!(
            "Rejected {} {}: {:?}",
            req.method(),
            req.uri().path(),
            rejection
        );
    })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, middleware, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use bistro_types::models::Role;

    use crate::config::AuthConfig;
    use crate::token::TokenIssuer;

    async fn whoami(Extension(principal): Extension<Principal>) -> String {
        principal.subject_id.to_string()
    }

    fn app(capability: Capability) -> (Router, TokenIssuer) {
        let config = Arc::new(AuthConfig::new("gate-test-secret"));
        let validator = Arc::new(TokenValidator::new(config.clone()));
        let gate = Gate::new(validator, capability);
        let router = Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(gate, authorize));
        (router, TokenIssuer::new(config))
    }

    async fn call(router: Router, auth: Option<String>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (router, _) = app(Capability::Any);
        let (status, body) = call(router, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing token"));
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_principal() {
        let (router, issuer) = app(Capability::Any);
        let token = issuer.issue(42, Role::Member).unwrap();
        let (status, body) = call(router, Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "42");
    }

    #[tokio::test]
    async fn member_is_forbidden_behind_admin_gate() {
        let (router, issuer) = app(Capability::Admin);
        let token = issuer.issue(42, Role::Member).unwrap();
        let (status, body) = call(router, Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("admin only"));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let (router, _) = app(Capability::Admin);
        let (status, _) = call(router, Some("Bearer abc.def.ghi".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
