//! Category deletion endpoint.

use axum::{Json, extract::Path};
use serde_json::{Value, json};

use crate::{
    Error,
    category::{CategoryId, delete_category},
    tenant::TenantDatabase,
};

/// Handle category deletion. Responds with a confirmation message.
pub async fn delete_category_endpoint(
    TenantDatabase(database): TenantDatabase,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Value>, Error> {
    let connection = database.lock()?;

    delete_category(&category_id, &connection)?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
