use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use bistro_auth::TokenError;
use bistro_orders::OrderError;
use bistro_types::api::ErrorResponse;

/// Every failure a handler can return. Rendered as
/// `{"status":"error","message":...}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    State(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Log the underlying cause and return a detail-free internal error.
    pub fn internal(context: &str, cause: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, cause);
        ApiError::Internal(context.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) | ApiError::State(_) => StatusCode::CONFLICT,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        ApiError::Validation("invalid payload".into())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::Validation("invalid id".into())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::SigningError => ApiError::internal("token error", err),
            TokenError::InsufficientRole => ApiError::Authorization("admin only".into()),
            other => ApiError::Authentication(other.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyOrder | OrderError::EmptyStatus => ApiError::Validation(err.to_string()),
            OrderError::UnknownMenuItem(_) => ApiError::NotFound(err.to_string()),
            OrderError::NotFound(_) => ApiError::NotFound("order not found".into()),
            OrderError::NotOwner => ApiError::Authorization(err.to_string()),
            OrderError::InvalidTransition(_) => ApiError::State("cannot cancel at this stage".into()),
            OrderError::Backend(e) => ApiError::internal("storage failure", e),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::internal("spawn_blocking join error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_types::models::OrderStatus;

    #[test]
    fn order_errors_map_to_status_classes() {
        let cases = [
            (OrderError::EmptyOrder, StatusCode::BAD_REQUEST),
            (OrderError::EmptyStatus, StatusCode::BAD_REQUEST),
            (OrderError::UnknownMenuItem(4), StatusCode::NOT_FOUND),
            (OrderError::NotFound(4), StatusCode::NOT_FOUND),
            (OrderError::NotOwner, StatusCode::FORBIDDEN),
            (
                OrderError::InvalidTransition(OrderStatus::Cancelled),
                StatusCode::CONFLICT,
            ),
            (
                OrderError::Backend(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_errors_do_not_leak_cause() {
        let err = ApiError::from(OrderError::Backend(anyhow::anyhow!("/var/db/secret.db locked")));
        assert_eq!(err.to_string(), "storage failure");
    }

    #[test]
    fn unknown_menu_message_names_the_id() {
        assert_eq!(
            ApiError::from(OrderError::UnknownMenuItem(12)).to_string(),
            "menu id 12 not found"
        );
    }
}
