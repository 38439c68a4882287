//! Products, with variants and gallery images edited inline.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    routing::{get, post, put},
    Json, Router,
};

use storefront_catalog::{ImageForm, ProductForm, VariantForm};
use storefront_core::{ImageId, ProductId, VariantId};

use crate::app::dto::VariantView;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/variants", post(create_variant))
        .route(
            "/:id/variants/:variant_id",
            put(update_variant).delete(delete_variant),
        )
        .route("/:id/images", post(create_image))
        .route("/:id/images/:image_id", put(update_image).delete(delete_image))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let products = services
        .store()
        .list_products()
        .await
        .map_err(errors::store_error_to_response)?;
    common::list_screen(&services, "products", &products, params).await
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductForm>, JsonRejection>,
) -> ApiResult {
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let product = services
        .store()
        .create_product(form)
        .await
        .map_err(errors::store_error_to_response)?;

    tracing::info!(
        product_id = %product.id,
        vendor_id = %product.vendor_id,
        category_id = %product.category_id,
        "product created"
    );
    let detail = services
        .product_detail(product.id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::created(detail))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ProductId = errors::parse_id(&id)?;
    let detail = services
        .product_detail(id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(detail))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductForm>, JsonRejection>,
) -> ApiResult {
    let id: ProductId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    services
        .store()
        .update_product(id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    let detail = services
        .product_detail(id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(detail))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: ProductId = errors::parse_id(&id)?;
    services
        .store()
        .delete_product(id)
        .await
        .map_err(errors::store_error_to_response)?;
    tracing::info!(product_id = %id, "product deleted");
    Ok(common::no_content())
}

// -- variants --

pub async fn create_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<VariantForm>, JsonRejection>,
) -> ApiResult {
    let product_id: ProductId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let variant = services
        .store()
        .create_variant(product_id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    variant_view(&services, variant).await.map(common::created)
}

pub async fn update_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, variant_id)): Path<(String, String)>,
    body: Result<Json<VariantForm>, JsonRejection>,
) -> ApiResult {
    let product_id: ProductId = errors::parse_id(&id)?;
    let variant_id: VariantId = errors::parse_id(&variant_id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let variant = services
        .store()
        .update_variant(product_id, variant_id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    variant_view(&services, variant).await.map(common::ok)
}

/// Images that showed this variant fall back to the product gallery.
pub async fn delete_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, variant_id)): Path<(String, String)>,
) -> ApiResult {
    let product_id: ProductId = errors::parse_id(&id)?;
    let variant_id: VariantId = errors::parse_id(&variant_id)?;
    services
        .store()
        .delete_variant(product_id, variant_id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::no_content())
}

// -- gallery images --

pub async fn create_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ImageForm>, JsonRejection>,
) -> ApiResult {
    let product_id: ProductId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let image = services
        .store()
        .create_image(product_id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::created(image))
}

pub async fn update_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, image_id)): Path<(String, String)>,
    body: Result<Json<ImageForm>, JsonRejection>,
) -> ApiResult {
    let product_id: ProductId = errors::parse_id(&id)?;
    let image_id: ImageId = errors::parse_id(&image_id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let image = services
        .store()
        .update_image(product_id, image_id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(image))
}

pub async fn delete_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, image_id)): Path<(String, String)>,
) -> ApiResult {
    let product_id: ProductId = errors::parse_id(&id)?;
    let image_id: ImageId = errors::parse_id(&image_id)?;
    services
        .store()
        .delete_image(product_id, image_id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::no_content())
}

async fn variant_view(
    services: &AppServices,
    variant: storefront_catalog::ProductVariant,
) -> Result<VariantView, axum::response::Response> {
    let store = services.store();
    let product = store
        .get_product(variant.product_id)
        .await
        .map_err(errors::store_error_to_response)?;
    let attributes = store.list_attributes().await.map_err(errors::store_error_to_response)?;
    let values = store
        .list_attribute_values(None)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(VariantView::new(variant, &product, &attributes, &values))
}
