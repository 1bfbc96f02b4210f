use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use priceguard_infra::StoreError;
use priceguard_lifecycle::{TransitionFailure, TransitionResult};

/// HTTP status for a transition result, from its structured failure kind
/// (never re-derived from message text).
pub fn transition_status_code(result: &TransitionResult) -> StatusCode {
    match result.failure {
        None => StatusCode::OK,
        Some(TransitionFailure::Validation) => StatusCode::BAD_REQUEST,
        Some(TransitionFailure::NotFound) => StatusCode::NOT_FOUND,
        Some(TransitionFailure::Conflict) => StatusCode::CONFLICT,
        Some(TransitionFailure::System) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("price record '{id}' not found"))
        }
        StoreError::Concurrency(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        other => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            other.to_string(),
        ),
    }
}

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
