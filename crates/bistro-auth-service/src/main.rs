use std::sync::Arc;

use tracing::info;

use bistro_api::auth::{self, AuthStateInner};
use bistro_api::config::ServiceConfig;
use bistro_auth::{AuthConfig, TokenIssuer};
use bistro_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,bistro_api=debug,bistro_auth=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let auth_config = Arc::new(AuthConfig::from_env()?);
    let config = ServiceConfig::from_env("bistro-auth.db")?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    let state = Arc::new(AuthStateInner {
        db,
        issuer: TokenIssuer::new(auth_config),
    });

    info!("Token lifetime: 24 hours");
    bistro_api::server::serve(auth::router(state), config.addr()?, "auth").await
}
