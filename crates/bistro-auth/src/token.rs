use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;

use bistro_types::api::Claims;
use bistro_types::models::Role;

use crate::config::AuthConfig;

/// Minimum role a caller must hold to pass validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Any,
    Admin,
}

/// The verified caller, attached to the request by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: i64,
    pub role: Role,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("token carries no recognized role")]
    MissingRole,
    #[error("insufficient role")]
    InsufficientRole,
    #[error("token signing failed")]
    SigningError,
}

/// Mints HS256 bearer tokens for verified identities.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: Arc<AuthConfig>,
}

impl TokenIssuer {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    pub fn issue(&self, subject_id: i64, role: Role) -> Result<String, TokenError> {
        self.issue_at(subject_id, role, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        subject_id: i64,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if self.config.secret().is_empty() {
            return Err(TokenError::SigningError);
        }

        let claims = Claims {
            sub: subject_id,
            role: Some(role.as_str().to_string()),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.config.token_ttl()).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret()),
        )
        .map_err(|_| TokenError::SigningError)
    }
}

/// Verifies tokens minted by [`TokenIssuer`] against the same shared key.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    config: Arc<AuthConfig>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self { config, validation }
    }

    /// Validate a raw `Authorization` header value (`Bearer <token>`).
    pub fn validate_header(
        &self,
        header_value: &str,
        capability: Capability,
    ) -> Result<Principal, TokenError> {
        let token = header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::MalformedToken)?;
        self.validate(token, capability)
    }

    pub fn validate(&self, token: &str, capability: Capability) -> Result<Principal, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret()),
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            _ => TokenError::MalformedToken,
        })?;

        let role = data
            .claims
            .role
            .as_deref()
            .and_then(Role::parse)
            .ok_or(TokenError::MissingRole)?;

        if capability == Capability::Admin && role != Role::Admin {
            return Err(TokenError::InsufficientRole);
        }

        Ok(Principal {
            subject_id: data.claims.sub,
            role,
        })
    }
}
