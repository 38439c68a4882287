//! Catalog persistence boundary.
//!
//! `CatalogStore` is the only way records reach storage. The in-memory store
//! backs dev and tests; the Postgres store is the persistent one. Both apply
//! the same uniqueness, reference and delete rules.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::{CatalogStore, StoreError, StoreResult};

/// Store handle shared across request handlers.
pub type SharedCatalogStore = Arc<dyn CatalogStore>;
