use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::warn;

use bistro_db::Database;
use bistro_types::models::MenuItem;

/// Read-only lookup of purchasable items, owned by the menu service.
#[async_trait]
pub trait CatalogReference: Send + Sync {
    /// `Ok(None)` means the catalog answered and the item does not exist.
    async fn find(&self, menu_id: i64) -> Result<Option<MenuItem>>;
}

/// Asks the menu service over HTTP (`GET {base_url}/{id}`).
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogReference for HttpCatalog {
    async fn find(&self, menu_id: i64) -> Result<Option<MenuItem>> {
        let url = format!("{}/{}", self.base_url, menu_id);
        let resp = self.client.get(&url).send().await?;

        match resp.status() {
            StatusCode::OK => Ok(Some(resp.json::<MenuItem>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            other => {
                warn!("Catalog lookup {} answered {}", url, other);
                Err(anyhow!("catalog lookup failed with status {}", other))
            }
        }
    }
}

/// Reads menu items straight from a shared database.
pub struct StoreCatalog {
    db: Arc<Database>,
}

impl StoreCatalog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogReference for StoreCatalog {
    async fn find(&self, menu_id: i64) -> Result<Option<MenuItem>> {
        Ok(self.db.get_menu_item(menu_id)?.map(MenuItem::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_catalog_resolves_existing_items_only() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let row = db.insert_menu_item("Tom Yum", "soup", 80.0).unwrap();
        let catalog = StoreCatalog::new(db);

        let item = catalog.find(row.id).await.unwrap().unwrap();
        assert_eq!(item.name, "Tom Yum");
        assert!(catalog.find(row.id + 100).await.unwrap().is_none());
    }

    #[test]
    fn http_catalog_trims_trailing_slash() {
        let catalog = HttpCatalog::new("http://menu:8080/").unwrap();
        assert_eq!(catalog.base_url, "http://menu:8080");
    }

    /// Menu stand-in: id 1 exists, id 500 fails, everything else is unknown.
    async fn serve_menu() -> String {
        use axum::{Json, Router, extract::Path, http::StatusCode, response::IntoResponse, routing::get};

        async fn lookup(Path(id): Path<i64>) -> axum::response::Response {
            match id {
                1 => Json(MenuItem {
                    id: 1,
                    name: "Khao Soi".into(),
                    description: "curry noodles".into(),
                    price: 85.0,
                })
                .into_response(),
                500 => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                _ => StatusCode::NOT_FOUND.into_response(),
            }
        }

        let app = Router::new().route("/menu/{id}", get(lookup));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/menu/")
    }

    #[tokio::test]
    async fn http_catalog_maps_menu_service_answers() {
        let catalog = HttpCatalog::new(serve_menu().await).unwrap();

        let item = catalog.find(1).await.unwrap().unwrap();
        assert_eq!(item.name, "Khao Soi");
        assert_eq!(item.price, 85.0);

        assert!(catalog.find(2).await.unwrap().is_none());
        assert!(catalog.find(500).await.is_err());
    }

    #[tokio::test]
    async fn unreachable_catalog_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let catalog = HttpCatalog::new(format!("http://{addr}")).unwrap();
        assert!(catalog.find(1).await.is_err());
    }
}
