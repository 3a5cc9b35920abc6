use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_transactions))
}

/// GET /api/transactions?limit=N
///
/// Most recent transactions first. `limit` defaults to 50 and is capped at
/// 500.
pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::TxnListQuery>,
) -> axum::response::Response {
    match services.recent_transactions(query.limit).await {
        Ok(txns) => {
            let items = txns.iter().map(dto::transaction_to_json).collect();
            (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
