//! Admin index and slug suggestions.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use serde_json::json;

use crate::app::dto::PrepopulateQuery;
use crate::app::errors::{self, ApiResult};
use crate::app::routes::common;
use crate::app::services::AppServices;

/// Every registered model with its list, filter, inline and ordering metadata.
pub async fn index(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    Ok(common::ok(&services.site))
}

/// `GET /admin/prepopulate/:model?field=slug&name=...`
///
/// Suggests a value for a prepopulated field from its source fields, the way
/// the edit page fills the slug while the name is typed.
pub async fn prepopulate(
    Extension(services): Extension<Arc<AppServices>>,
    Path(model): Path<String>,
    Query(query): Query<PrepopulateQuery>,
) -> ApiResult {
    let admin = services.site.get(&model).map_err(errors::admin_error_to_response)?;
    let suggestion = admin.prepopulate(&query.field, |source| query.sources.get(source).cloned());

    match suggestion {
        Some(value) => Ok(common::ok(json!({ "field": query.field, "value": value }))),
        None => Err(errors::json_error(
            axum::http::StatusCode::NOT_FOUND,
            "not_prepopulated",
            format!("{} has no prepopulated field `{}`", admin.model, query.field),
        )),
    }
}
