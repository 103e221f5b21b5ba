use std::sync::Arc;

use tracing::info;

use bistro_api::config::ServiceConfig;
use bistro_api::orders::{self, OrderStateInner};
use bistro_auth::{AuthConfig, TokenValidator};
use bistro_db::Database;
use bistro_orders::{CatalogReference, HttpCatalog, OrderLifecycle, StoreCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_service=debug,bistro_api=debug,bistro_orders=debug,tower_http=debug".into()),
        )
        .init();

    let auth_config = Arc::new(AuthConfig::from_env()?);
    let config = ServiceConfig::from_env("bistro-orders.db")?;

    let db = Arc::new(Database::open(&config.db_path)?);

    // Catalog: ask the menu service when its URL is known, otherwise read the
    // menu table of a shared database.
    let catalog: Arc<dyn CatalogReference> = match std::env::var("BISTRO_MENU_URL") {
        Ok(url) if !url.is_empty() => {
            info!("Catalog lookups via menu service at {}", url);
            Arc::new(HttpCatalog::new(url)?)
        }
        _ => {
            info!("Catalog lookups via shared database {}", config.db_path.display());
            Arc::new(StoreCatalog::new(db.clone()))
        }
    };

    let state = Arc::new(OrderStateInner {
        lifecycle: OrderLifecycle::new(db, catalog),
    });
    let validator = Arc::new(TokenValidator::new(auth_config));

    bistro_api::server::serve(orders::router(state, validator), config.addr()?, "order").await
}
