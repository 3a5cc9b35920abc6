//! Money-movement handlers: deposit, withdraw, transfer.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use corebank_core::{DomainError, money};
use corebank_infra::StoreError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_no): Path<String>,
    Json(body): Json<dto::AmountRequest>,
) -> axum::response::Response {
    match services.deposit(&account_no, &body.amount).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(serde_json::json!({ "balance": money::to_f64(balance) })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_no): Path<String>,
    Json(body): Json<dto::AmountRequest>,
) -> axum::response::Response {
    match services.withdraw(&account_no, &body.amount).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(serde_json::json!({ "balance": money::to_f64(balance) })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    match services.transfer(&body.from, &body.to, &body.amount).await {
        Ok((from_balance, to_balance)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Transferred",
                "from_balance": money::to_f64(from_balance),
                "to_balance": money::to_f64(to_balance),
            })),
        )
            .into_response(),
        // Deliberately does not say which side was missing.
        Err(StoreError::Domain(DomainError::NotFound)) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "one or both accounts not found",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}
