use core::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use storefront_admin::AdminError;
use storefront_core::DomainError;
use storefront_infra::StoreError;

/// Handler result: both arms are finished responses.
pub type ApiResult = Result<Response, Response>;

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Validation(e) => domain_error_to_response(e),
        StoreError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Integrity(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "integrity_error", msg),
        StoreError::Storage(msg) => {
            tracing::error!(error = %msg, "catalog storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn admin_error_to_response(err: AdminError) -> Response {
    match err {
        AdminError::UnknownFilter { .. } => json_error(StatusCode::BAD_REQUEST, "invalid_filter", err.to_string()),
        AdminError::NotRegistered(_) => json_error(StatusCode::NOT_FOUND, "not_registered", err.to_string()),
        AdminError::AlreadyRegistered(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "admin_error", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Unwrap a JSON body, reporting malformed input as a 400.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())),
    }
}

pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}
