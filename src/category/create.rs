//! Category creation endpoint.

use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};

use crate::{
    Error,
    category::{Category, CategoryName, create_category, domain::CategoryFormData},
    tenant::TenantDatabase,
    transaction_type::TransactionType,
};

/// Handle category creation. Responds with the new category.
pub async fn create_category_endpoint(
    TenantDatabase(database): TenantDatabase,
    form: Result<Json<CategoryFormData>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let Json(form) = form.map_err(|rejection| Error::InvalidJson(rejection.body_text()))?;

    let category_type: TransactionType = form.category_type.parse()?;
    let name = CategoryName::new(&form.name)?;

    let connection = database.lock()?;
    let category = create_category(name, category_type, &connection)?;
    tracing::debug!(
        "Created category {} ({}) in {}",
        category.name,
        category.category_type,
        database.name()
    );

    Ok((StatusCode::CREATED, Json(category)))
}
