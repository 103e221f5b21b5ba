use chrono::Duration;
use thiserror::Error;
use tracing::warn;

/// Development-only signing secret. Never used unless the operator opts in
/// through `BISTRO_ALLOW_INSECURE_SECRET`.
pub const INSECURE_DEV_SECRET: &str = "MyVerySecretKeyChangeThis";

/// Secrets that appear in sample configs and must never sign real tokens.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me",
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

/// Tokens expire a fixed 24 hours after issue.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BISTRO_JWT_SECRET is unset (set BISTRO_ALLOW_INSECURE_SECRET=1 to use the development secret)")]
    MissingSecret,
    #[error("BISTRO_JWT_SECRET is still a placeholder value")]
    PlaceholderSecret,
}

/// Immutable signing configuration, built once at startup and shared by
/// reference with the issuer and every validator.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("BISTRO_JWT_SECRET").unwrap_or_default();
        if !secret.is_empty() {
            if PLACEHOLDER_SECRETS.contains(&secret.as_str()) || secret == INSECURE_DEV_SECRET {
                return Err(ConfigError::PlaceholderSecret);
            }
            return Ok(Self::new(secret));
        }

        let allow_insecure = lookup("BISTRO_ALLOW_INSECURE_SECRET")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if !allow_insecure {
            return Err(ConfigError::MissingSecret);
        }

        warn!("Using the compiled-in development JWT secret. Do NOT run this in production.");
        Ok(Self::new(INSECURE_DEV_SECRET))
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}
