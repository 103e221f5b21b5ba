pub mod auth;
pub mod config;
pub mod error;
pub mod menu;
pub mod orders;
pub mod server;
