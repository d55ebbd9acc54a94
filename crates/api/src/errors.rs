use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gatekeep_authz::EngineError;
use gatekeep_core::{DomainError, ErrorKind};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: &DomainError) -> axum::response::Response {
    let status = StatusCode::from_u16(err.kind().http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = match err.kind() {
        ErrorKind::NotFound => "not_found",
        ErrorKind::Validation => "validation_error",
        ErrorKind::Conflict => "conflict",
        ErrorKind::StoreFailure => "store_error",
    };
    json_error(status, code, err.to_string())
}

/// Any engine failure is a 5xx; the caller is never told "no access" when
/// the truth is "could not determine".
pub fn engine_error_to_response(err: &EngineError) -> axum::response::Response {
    tracing::error!(error = %err, "authorization backend failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        "authorization backend unavailable",
    )
}
