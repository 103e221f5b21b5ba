use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Listener and storage settings shared by all three services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl ServiceConfig {
    pub fn from_env(default_db_path: &str) -> Result<Self> {
        let host = std::env::var("BISTRO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("BISTRO_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .context("BISTRO_PORT must be a port number")?;
        let db_path: PathBuf = std::env::var("BISTRO_DB_PATH")
            .unwrap_or_else(|_| default_db_path.into())
            .into();

        Ok(Self {
            host,
            port,
            db_path,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
