use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    routing::get,
    Json, Router,
};

use storefront_catalog::BrandForm;
use storefront_core::BrandId;

use crate::app::errors::{self, ApiResult};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/:id", get(get_brand).put(update_brand).delete(delete_brand))
}

pub async fn list_brands(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let brands = services
        .store()
        .list_brands()
        .await
        .map_err(errors::store_error_to_response)?;
    common::list_screen(&services, "brands", &brands, params).await
}

pub async fn create_brand(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<BrandForm>, JsonRejection>,
) -> ApiResult {
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let brand = services
        .store()
        .create_brand(form)
        .await
        .map_err(errors::store_error_to_response)?;

    tracing::info!(brand_id = %brand.id, slug = %brand.slug, "brand created");
    Ok(common::created(brand))
}

pub async fn get_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: BrandId = errors::parse_id(&id)?;
    let brand = services
        .store()
        .get_brand(id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(brand))
}

pub async fn update_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<BrandForm>, JsonRejection>,
) -> ApiResult {
    let id: BrandId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let brand = services
        .store()
        .update_brand(id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(brand))
}

/// Products of a deleted brand stay, with the brand cleared.
pub async fn delete_brand(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: BrandId = errors::parse_id(&id)?;
    services
        .store()
        .delete_brand(id)
        .await
        .map_err(errors::store_error_to_response)?;
    tracing::info!(brand_id = %id, "brand deleted");
    Ok(common::no_content())
}
