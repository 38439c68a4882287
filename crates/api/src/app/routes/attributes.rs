//! Attributes, with their values edited inline.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    routing::{get, post, put},
    Json, Router,
};

use storefront_catalog::{AttributeForm, AttributeValueForm};
use storefront_core::{AttributeId, AttributeValueId};

use crate::app::dto::{AttributeDetail, AttributeValueView};
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_attributes).post(create_attribute))
        .route(
            "/:id",
            get(get_attribute).put(update_attribute).delete(delete_attribute),
        )
        .route("/:id/values", post(create_value))
        .route("/:id/values/:value_id", put(update_value).delete(delete_value))
}

pub async fn list_attributes(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let attributes = services
        .store()
        .list_attributes()
        .await
        .map_err(errors::store_error_to_response)?;
    common::list_screen(&services, "attributes", &attributes, params).await
}

pub async fn create_attribute(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<AttributeForm>, JsonRejection>,
) -> ApiResult {
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let attribute = services
        .store()
        .create_attribute(form)
        .await
        .map_err(errors::store_error_to_response)?;

    tracing::info!(attribute_id = %attribute.id, name = %attribute.name, "attribute created");
    Ok(common::created(AttributeDetail::new(attribute, Vec::new())))
}

pub async fn get_attribute(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: AttributeId = errors::parse_id(&id)?;
    attribute_detail(&services, id).await.map(common::ok)
}

pub async fn update_attribute(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<AttributeForm>, JsonRejection>,
) -> ApiResult {
    let id: AttributeId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    services
        .store()
        .update_attribute(id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    attribute_detail(&services, id).await.map(common::ok)
}

pub async fn delete_attribute(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: AttributeId = errors::parse_id(&id)?;
    services
        .store()
        .delete_attribute(id)
        .await
        .map_err(errors::store_error_to_response)?;
    tracing::info!(attribute_id = %id, "attribute deleted");
    Ok(common::no_content())
}

pub async fn create_value(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<AttributeValueForm>, JsonRejection>,
) -> ApiResult {
    let attribute_id: AttributeId = errors::parse_id(&id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let store = services.store();
    let value = store
        .create_attribute_value(attribute_id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    let attribute = store
        .get_attribute(attribute_id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::created(AttributeValueView::new(value, &attribute)))
}

pub async fn update_value(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, value_id)): Path<(String, String)>,
    body: Result<Json<AttributeValueForm>, JsonRejection>,
) -> ApiResult {
    let attribute_id: AttributeId = errors::parse_id(&id)?;
    let value_id: AttributeValueId = errors::parse_id(&value_id)?;
    let form = errors::json_body(body)?
        .clean()
        .map_err(errors::domain_error_to_response)?;
    let store = services.store();
    let value = store
        .update_attribute_value(attribute_id, value_id, form)
        .await
        .map_err(errors::store_error_to_response)?;
    let attribute = store
        .get_attribute(attribute_id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::ok(AttributeValueView::new(value, &attribute)))
}

/// Also unlinks the value from every variant that used it.
pub async fn delete_value(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, value_id)): Path<(String, String)>,
) -> ApiResult {
    let attribute_id: AttributeId = errors::parse_id(&id)?;
    let value_id: AttributeValueId = errors::parse_id(&value_id)?;
    services
        .store()
        .delete_attribute_value(attribute_id, value_id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(common::no_content())
}

async fn attribute_detail(services: &AppServices, id: AttributeId) -> Result<AttributeDetail, axum::response::Response> {
    let store = services.store();
    let attribute = store.get_attribute(id).await.map_err(errors::store_error_to_response)?;
    let values = store
        .list_attribute_values(Some(id))
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(AttributeDetail::new(attribute, values))
}
