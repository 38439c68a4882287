use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    routing::get,
    Json, Router,
};

use storefront_catalog::CategoryForm;
use storefront_core::CategoryId;

use crate::app::dto::CategoryDetail;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let categories = services
        .store()
        .list_categories()
        .await
        .map_err(errors::store_error_to_response)?;
    common::list_screen(&services, "categories", &categories, params).await
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CategoryForm>, JsonRejection>,
) -> ApiResult {
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let store = services.store();
    let category = store
        .create_category(form)
        .await
        .map_err(errors::store_error_to_response)?;
    let all = store.list_categories().await.map_err(errors::store_error_to_response)?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
    Ok(common::created(CategoryDetail::new(category, &all)))
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: CategoryId = errors::parse_id(&id)?;
    let store = services.store();
    let category = store.get_category(id).await.map_err(errors::store_error_to_response)?;
    let all = store.list_categories().await.map_err(errors::store_error_to_response)?;
    Ok(common::ok(CategoryDetail::new(category, &all)))
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<CategoryForm>, JsonRejection>,
) -> ApiResult {
    let id: CategoryId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let store = services.store();
    let category = store
        .update_category(id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    let all = store.list_categories().await.map_err(errors::store_error_to_response)?;
    Ok(common::ok(CategoryDetail::new(category, &all)))
}

/// Takes the whole subtree along with every product filed under it.
pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: CategoryId = errors::parse_id(&id)?;
    services
        .store()
        .delete_category(id)
        .await
        .map_err(errors::store_error_to_response)?;
    tracing::info!(category_id = %id, "category deleted");
    Ok(common::no_content())
}
