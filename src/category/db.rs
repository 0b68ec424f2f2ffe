//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    database::{timestamp_from_row, timestamp_to_sql},
    transaction::count_transactions_in_category,
    transaction_type::TransactionType,
};

/// Create a category and return it with its generated ID and timestamp.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategory] if a category with the same name and type
///   already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    if find_category(&name, category_type, connection)?.is_some() {
        return Err(Error::DuplicateCategory);
    }

    insert_category(name, category_type, OffsetDateTime::now_utc(), connection)
}

/// Insert a category without checking for duplicates first.
///
/// The unique index on (name, type) still rejects duplicates.
pub(crate) fn insert_category(
    name: CategoryName,
    category_type: TransactionType,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = Category {
        id: Uuid::new_v4().to_string(),
        name,
        category_type,
        created_at,
    };

    connection.execute(
        "INSERT INTO category (id, name, type, created_at) VALUES (?1, ?2, ?3, ?4);",
        (
            &category.id,
            category.name.as_ref(),
            category.category_type,
            timestamp_to_sql(category.created_at)?,
        ),
    )?;

    Ok(category)
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: &str, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, type, created_at FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories in the order they were stored.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, type, created_at FROM category ORDER BY rowid ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Find the category with exactly this name and type.
pub fn find_category(
    name: &CategoryName,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, type, created_at FROM category WHERE name = ?1 AND type = ?2;")?
        .query_row((name.as_ref(), category_type), map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Whether any category, of either type, has this name.
pub fn category_name_exists(name: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM category WHERE name = ?1);",
            [name],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get the total number of categories in the database.
pub fn count_categories(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM category;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete a category by ID if no transaction uses its name.
///
/// Transactions store the category name rather than its ID, so a
/// transaction under a same-named category of the other type also blocks the
/// deletion.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `category_id` does not refer to a category,
/// - [Error::CategoryInUse] if a transaction references the category's name,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(category_id: &CategoryId, connection: &Connection) -> Result<(), Error> {
    let category = match get_category(category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    };

    if count_transactions_in_category(category.name.as_ref(), connection)? > 0 {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            created_at TEXT NOT NULL,
            UNIQUE (name, type)
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let category_type = row.get(2)?;
    let created_at = timestamp_from_row(row, 3)?;

    Ok(Category {
        id,
        name,
        category_type,
        created_at,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{
            CategoryName, count_categories, create_category, delete_category, get_all_categories,
            get_category,
        },
        database::initialize,
        transaction::{Transaction, create_transaction},
        transaction_type::TransactionType,
    };

    use super::{category_name_exists, insert_category};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn name(name: &str) -> CategoryName {
        CategoryName::new_unchecked(name)
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();

        let category = create_category(name("Freelance"), TransactionType::Income, &connection)
            .expect("Could not create category");

        assert!(!category.id.is_empty());
        assert_eq!(category.name, name("Freelance"));
        assert_eq!(category.category_type, TransactionType::Income);
        assert_eq!(get_category(&category.id, &connection), Ok(category));
    }

    #[test]
    fn create_category_fails_on_duplicate_name_and_type() {
        let connection = get_test_db_connection();
        create_category(name("Freelance"), TransactionType::Income, &connection).unwrap();

        let duplicate = create_category(name("Freelance"), TransactionType::Income, &connection);

        assert_eq!(duplicate, Err(Error::DuplicateCategory));
        assert_eq!(count_categories(&connection), Ok(1));
    }

    #[test]
    fn same_name_with_other_type_is_not_a_duplicate() {
        let connection = get_test_db_connection();
        create_category(name("Gifts"), TransactionType::Income, &connection).unwrap();

        let result = create_category(name("Gifts"), TransactionType::Expense, &connection);

        assert!(result.is_ok());
        assert_eq!(count_categories(&connection), Ok(2));
    }

    #[test]
    fn unique_index_rejects_duplicates_that_skip_the_check() {
        let connection = get_test_db_connection();
        let created_at = time::OffsetDateTime::now_utc();
        insert_category(name("Travel"), TransactionType::Expense, created_at, &connection)
            .unwrap();

        let result = insert_category(
            name("Travel"),
            TransactionType::Expense,
            created_at,
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategory));
    }

    #[test]
    fn get_all_categories_returns_storage_order() {
        let connection = get_test_db_connection();
        let first = create_category(name("Zoo"), TransactionType::Expense, &connection).unwrap();
        let second = create_category(name("Art"), TransactionType::Expense, &connection).unwrap();

        let categories = get_all_categories(&connection).unwrap();

        assert_eq!(categories, vec![first, second]);
    }

    #[test]
    fn category_name_exists_ignores_type() {
        let connection = get_test_db_connection();
        create_category(name("Gifts"), TransactionType::Expense, &connection).unwrap();

        assert_eq!(category_name_exists("Gifts", &connection), Ok(true));
        assert_eq!(category_name_exists("gifts", &connection), Ok(false));
    }

    #[test]
    fn delete_unused_category_succeeds() {
        let connection = get_test_db_connection();
        let category =
            create_category(name("Travel"), TransactionType::Expense, &connection).unwrap();

        let result = delete_category(&category.id, &connection);

        assert_eq!(result, Ok(()));
        assert_eq!(get_category(&category.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_category_fails() {
        let connection = get_test_db_connection();

        let result = delete_category(&"not-a-real-id".to_owned(), &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn delete_category_in_use_fails() {
        let connection = get_test_db_connection();
        let category =
            create_category(name("Travel"), TransactionType::Expense, &connection).unwrap();
        create_transaction(
            Transaction::build(TransactionType::Expense, 99.0, "Travel", date!(2024 - 03 - 02)),
            &connection,
        )
        .unwrap();

        let result = delete_category(&category.id, &connection);

        assert_eq!(result, Err(Error::CategoryInUse));
        assert!(get_category(&category.id, &connection).is_ok());
    }

    #[test]
    fn delete_is_blocked_by_transactions_under_same_name_of_other_type() {
        let connection = get_test_db_connection();
        let income = create_category(name("Gifts"), TransactionType::Income, &connection).unwrap();
        create_category(name("Gifts"), TransactionType::Expense, &connection).unwrap();
        create_transaction(
            Transaction::build(TransactionType::Expense, 25.0, "Gifts", date!(2024 - 03 - 02)),
            &connection,
        )
        .unwrap();

        let result = delete_category(&income.id, &connection);

        assert_eq!(result, Err(Error::CategoryInUse));
    }
}
