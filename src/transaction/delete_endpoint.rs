use axum::{Json, extract::Path};
use serde_json::{Value, json};

use crate::{
    Error,
    tenant::TenantDatabase,
    transaction::{TransactionId, delete_transaction},
};

/// A route handler for deleting a transaction, responds with a confirmation
/// message.
pub async fn delete_transaction_endpoint(
    TenantDatabase(database): TenantDatabase,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = database.lock()?;

    delete_transaction(&transaction_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
