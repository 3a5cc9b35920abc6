use axum::{
    Router,
    routing::post,
};

pub mod customers;
pub mod ledger;
pub mod system;
pub mod transactions;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/customers", customers::router())
        .route("/transfer", post(ledger::transfer))
        .nest("/transactions", transactions::router())
}
