//! Application router configuration.

use axum::{
    Json, Router,
    routing::{delete, get},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    category::{create_category_endpoint, delete_category_endpoint, list_categories_endpoint},
    endpoints,
    not_found::get_404_not_found,
    summary::get_monthly_summary_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let categories = get(list_categories_endpoint).post(create_category_endpoint);
    let transactions = get(list_transactions_endpoint).post(create_transaction_endpoint);

    Router::new()
        .route(endpoints::ROOT, get(get_index))
        .route(endpoints::CATEGORIES, categories.clone())
        .route(endpoints::CATEGORIES_NO_SLASH, categories)
        .route(endpoints::CATEGORY, delete(delete_category_endpoint))
        .route(endpoints::TRANSACTIONS, transactions.clone())
        .route(endpoints::TRANSACTIONS_NO_SLASH, transactions)
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(
            endpoints::MONTHLY_SUMMARY,
            get(get_monthly_summary_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' greets the client and points at the API.
async fn get_index() -> Json<Value> {
    Json(json!({ "message": "Welcome to FinTraQ API", "api": "/api" }))
}
