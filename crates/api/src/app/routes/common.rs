use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use storefront_admin::{AdminRecord, ListQuery};

use crate::app::dto::ListResponse;
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;

/// Render the list screen of `route` over `records`.
///
/// `params` carries the search term (`q`) and one entry per filter.
pub async fn list_screen<R: AdminRecord>(
    services: &AppServices,
    route: &str,
    records: &[R],
    params: HashMap<String, String>,
) -> ApiResult {
    let admin = services.site.get(route).map_err(errors::admin_error_to_response)?;
    let lookups = services.lookups().await.map_err(errors::store_error_to_response)?;
    let query = ListQuery::from_params(params);

    let rows = admin
        .list(records, &query, &lookups)
        .map_err(errors::admin_error_to_response)?;
    let filters = admin.filter_choices(records, &lookups);

    Ok(Json(ListResponse::new(admin, rows, filters)).into_response())
}

pub fn created<T: Serialize>(body: T) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

pub fn ok<T: Serialize>(body: T) -> Response {
    Json(body).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
