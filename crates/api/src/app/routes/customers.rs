use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::routes::ledger;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:account_no", get(get_customer).delete(delete_customer))
        .route("/:account_no/deposit", post(ledger::deposit))
        .route("/:account_no/withdraw", post(ledger::withdraw))
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_customers().await {
        Ok(customers) => {
            let items = customers.iter().map(dto::customer_to_json).collect();
            (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    match services.register_customer(body.into_draft()).await {
        Ok(account_no) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "account_no": account_no.as_str() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_no): Path<String>,
) -> axum::response::Response {
    match services.get_customer(&account_no).await {
        Ok(customer) => {
            (StatusCode::OK, Json(dto::customer_profile_to_json(&customer))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_no): Path<String>,
) -> axum::response::Response {
    match services.delete_customer(&account_no).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Deleted" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
