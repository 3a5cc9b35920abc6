use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use corebank_core::DomainError;
use corebank_infra::StoreError;

/// Map a store/domain error onto a consistent JSON error response.
///
/// Each domain condition keeps a stable machine-checkable `error` code; the
/// `message` is the short human-readable form. Storage internals never reach
/// the client.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(domain) => domain_error_to_response(domain),
        StoreError::Storage(msg) => {
            tracing::error!("storage failure: {msg}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "storage failure",
            )
        }
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match &err {
        DomainError::Validation { .. } => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        DomainError::Conflict(_) => json_error(StatusCode::BAD_REQUEST, "conflict", err.to_string()),
        DomainError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "customer not found")
        }
        DomainError::InvalidAmount(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_amount", err.to_string())
        }
        DomainError::InsufficientFunds => json_error(
            StatusCode::BAD_REQUEST,
            "insufficient_funds",
            err.to_string(),
        ),
        DomainError::InvalidRequest(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", err.to_string())
        }
        DomainError::GenerationExhausted { .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "generation_exhausted",
            err.to_string(),
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
