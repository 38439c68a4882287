//! HTTP admin API over the catalog store.

pub mod app;
pub mod config;
pub mod middleware;
