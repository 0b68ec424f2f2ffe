//! Listing transactions, optionally for a single month.

use axum::{
    Json,
    extract::{Query, rejection::QueryRejection},
};
use serde::Deserialize;

use crate::{
    Error,
    tenant::TenantDatabase,
    transaction::{Month, Transaction, get_transactions},
};

/// Query parameters for the transaction list endpoint.
#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    /// Only list transactions in this month, written `YYYY-MM`.
    pub month: Option<String>,
}

/// Route handler for listing transactions, newest first.
pub async fn list_transactions_endpoint(
    TenantDatabase(database): TenantDatabase,
    query: Result<Query<TransactionListQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidJson(rejection.body_text()))?;

    let month = match query.month.as_deref() {
        None | Some("") => None,
        Some(month) => Some(Month::new(month)?),
    };

    let connection = database.lock()?;

    get_transactions(month.as_ref(), &connection).map(Json)
}
