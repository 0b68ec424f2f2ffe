//! Listing categories, seeding a fresh database on first use.

use axum::Json;
use rusqlite::Connection;

use crate::{
    Error,
    category::{Category, count_categories, get_all_categories},
    seed::seed_categories,
    tenant::TenantDatabase,
};

/// Return every category, seeding the predefined taxonomy first if the
/// database has no categories at all.
///
/// The emptiness check runs on every call, so a failed seed is retried by the
/// next call.
pub fn list_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    if count_categories(connection)? == 0 {
        tracing::info!("No categories found, seeding predefined categories");
        seed_categories(connection)?;
    }

    get_all_categories(connection)
}

/// Route handler for listing the categories of the requested tenant.
pub async fn list_categories_endpoint(
    TenantDatabase(database): TenantDatabase,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = database.lock()?;

    list_categories(&connection).map(Json)
}

#[cfg(test)]
mod list_categories_tests {
    use rusqlite::Connection;

    use crate::{
        category::{CategoryName, create_category, list_categories},
        database::initialize,
        seed::PREDEFINED_CATEGORIES,
        transaction_type::TransactionType,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn empty_database_is_seeded_with_predefined_categories() {
        let connection = get_test_db_connection();

        let categories = list_categories(&connection).unwrap();

        assert_eq!(categories.len(), PREDEFINED_CATEGORIES.len());
        let income = categories
            .iter()
            .filter(|category| category.category_type == TransactionType::Income)
            .count();
        assert_eq!(income, 5);
        assert_eq!(categories.len() - income, 12);
    }

    #[test]
    fn listing_twice_does_not_seed_twice() {
        let connection = get_test_db_connection();

        let first = list_categories(&connection).unwrap();
        let second = list_categories(&connection).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), 17);
    }

    #[test]
    fn non_empty_database_is_not_seeded() {
        let connection = get_test_db_connection();
        let category = create_category(
            CategoryName::new_unchecked("Pocket Money"),
            TransactionType::Income,
            &connection,
        )
        .unwrap();

        let categories = list_categories(&connection).unwrap();

        assert_eq!(categories, vec![category]);
    }
}

#[cfg(test)]
mod list_categories_endpoint_tests {
    use axum::http::StatusCode;

    use crate::{
        category::Category,
        test_utils::{get_test_server, tenant_header},
    };

    #[tokio::test]
    async fn fresh_tenant_gets_seventeen_seeded_categories() {
        let server = get_test_server();
        let (header_name, header_value) = tenant_header("brand-new");

        let response = server
            .get("/api/categories/")
            .add_header(header_name, header_value)
            .await;

        response.assert_status(StatusCode::OK);
        let categories: Vec<Category> = response.json();
        assert_eq!(categories.len(), 17);
    }

    #[tokio::test]
    async fn route_without_trailing_slash_is_served() {
        let server = get_test_server();

        server.get("/api/categories").await.assert_status_ok();
    }

    #[tokio::test]
    async fn invalid_tenant_header_is_rejected() {
        let server = get_test_server();
        let (header_name, header_value) = tenant_header("no spaces allowed");

        let response = server
            .get("/api/categories/")
            .add_header(header_name, header_value)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["detail"], "Invalid tenant database name");
    }
}
