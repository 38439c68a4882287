use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    routing::get,
    Json, Router,
};

use storefront_catalog::VendorForm;
use storefront_core::VendorId;

use crate::app::errors::{self, ApiResult};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_vendors).post(create_vendor))
        .route("/:id", get(get_vendor).put(update_vendor).delete(delete_vendor))
}

pub async fn list_vendors(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let vendors = services
        .store()
        .list_vendors()
        .await
        .map_err(errors::store_error_to_response)?;
    common::list_screen(&services, "vendors", &vendors, params).await
}

pub async fn create_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<VendorForm>, JsonRejection>,
) -> ApiResult {
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let vendor = services
        .store()
        .create_vendor(form)
        .await
        .map_err(errors::store_error_to_response)?;

    tracing::info!(vendor_id = %vendor.id, user_id = %vendor.user_id, "vendor created");
    Ok(common::created(vendor))
}

pub async fn get_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: VendorId = errors::parse_id(&id)?;
    let vendor = services
        .store()
        .get_vendor(id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(vendor))
}

pub async fn update_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<VendorForm>, JsonRejection>,
) -> ApiResult {
    let id: VendorId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let vendor = services
        .store()
        .update_vendor(id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(vendor))
}

/// Deleting a vendor takes its products with it.
pub async fn delete_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: VendorId = errors::parse_id(&id)?;
    services
        .store()
        .delete_vendor(id)
        .await
        .map_err(errors::store_error_to_response)?;
    tracing::info!(vendor_id = %id, "vendor deleted");
    Ok(common::no_content())
}
