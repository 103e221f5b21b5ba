//! Order lifecycle: creation against the catalog, owner-scoped
//! cancellation, and administrative status changes.

pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod store;

pub use catalog::{CatalogReference, HttpCatalog, StoreCatalog};
pub use error::OrderError;
pub use lifecycle::{NewOrderLine, OrderLifecycle};
pub use store::OrderStore;
