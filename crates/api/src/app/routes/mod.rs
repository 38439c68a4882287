use axum::{routing::get, Router};

pub mod attributes;
pub mod brands;
pub mod categories;
pub mod common;
pub mod products;
pub mod site;
pub mod system;
pub mod vendors;

/// Router for everything under `/admin`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(site::index))
        .route("/prepopulate/:model", get(site::prepopulate))
        .nest("/categories", categories::router())
        .nest("/vendors", vendors::router())
        .nest("/brands", brands::router())
        .nest("/attributes", attributes::router())
        .nest("/products", products::router())
}
