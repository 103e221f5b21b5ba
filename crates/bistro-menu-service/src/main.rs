use std::sync::Arc;

use bistro_api::config::ServiceConfig;
use bistro_api::menu::{self, MenuStateInner};
use bistro_auth::{AuthConfig, TokenValidator};
use bistro_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menu_service=debug,bistro_api=debug,bistro_auth=debug,tower_http=debug".into()),
        )
        .init();

    let auth_config = Arc::new(AuthConfig::from_env()?);
    let config = ServiceConfig::from_env("bistro-menu.db")?;

    let db = Arc::new(Database::open(&config.db_path)?);
    let validator = Arc::new(TokenValidator::new(auth_config));
    let state = Arc::new(MenuStateInner { db });

    bistro_api::server::serve(menu::router(state, validator), config.addr()?, "menu").await
}
