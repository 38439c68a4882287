//! Infrastructure layer: catalog storage (in-memory and Postgres).

pub mod store;

#[cfg(test)]
mod integration_tests;

pub use store::{
    CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, SharedCatalogStore, StoreError,
    StoreResult,
};
