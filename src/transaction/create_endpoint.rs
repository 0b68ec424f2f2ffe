//! Transaction creation endpoint.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    tenant::TenantDatabase,
    timezone::today_in,
    transaction::{Transaction, create_transaction},
    transaction_type::TransactionType,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Request body for creating a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionFormData {
    pub transaction_type: String,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    /// Defaults to today in the server's timezone.
    pub transaction_date: Option<Date>,
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    TenantDatabase(database): TenantDatabase,
    form: Result<Json<TransactionFormData>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let Json(form) = form.map_err(|rejection| Error::InvalidJson(rejection.body_text()))?;

    let transaction_type: TransactionType = form.transaction_type.parse()?;
    let transaction_date = match form.transaction_date {
        Some(date) => date,
        None => today_in(&state.local_timezone)?,
    };
    let builder = Transaction::build(
        transaction_type,
        form.amount,
        &form.category,
        transaction_date,
    )
    .description(form.description);

    let connection = database.lock()?;
    let transaction = create_transaction(builder, &connection)?;
    tracing::debug!(
        "Created {} transaction {} in {}",
        transaction.transaction_type,
        transaction.id,
        database.name()
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}
