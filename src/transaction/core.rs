//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    Error,
    category::category_name_exists,
    database::{timestamp_from_row, timestamp_to_sql},
    transaction::Month,
    transaction_type::TransactionType,
};

/// The most transactions a single query returns.
pub const TRANSACTION_FETCH_LIMIT: u32 = 1000;

/// Database identifier for a transaction, a UUID string.
pub type TransactionId = String;

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// The name of the category at the time the transaction was created.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
        transaction_date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            category: category.to_owned(),
            description: None,
            transaction_date,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::{transaction::Transaction, transaction_type::TransactionType};
///
/// let builder = Transaction::build(
///         TransactionType::Expense,
///         45.99,
///         "Food & Dining",
///         date!(2025-01-15),
///     )
///     .description(Some("Coffee beans".to_owned()));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,

    /// The monetary amount of the transaction.
    ///
    /// Always positive, the direction comes from `transaction_type`.
    pub amount: f64,

    /// The name of an existing category.
    ///
    /// Stored as the name itself rather than a category ID.
    pub category: String,

    /// An optional human-readable description.
    pub description: Option<String>,

    /// The date when the transaction occurred.
    pub transaction_date: Date,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a finite number above zero,
/// - [Error::UnknownCategory] if no category has the builder's category name,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.amount.is_finite() || builder.amount <= 0.0 {
        return Err(Error::InvalidAmount(builder.amount));
    }

    if !category_name_exists(&builder.category, connection)? {
        return Err(Error::UnknownCategory(builder.category));
    }

    insert_transaction(builder, connection)
}

/// Insert a transaction without checking that its category exists.
pub(crate) fn insert_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        transaction_type: builder.transaction_type,
        amount: builder.amount,
        category: builder.category,
        description: builder.description,
        transaction_date: builder.transaction_date,
        created_at: OffsetDateTime::now_utc(),
    };

    connection.execute(
        "INSERT INTO \"transaction\"
            (id, transaction_type, amount, category, description, transaction_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &transaction.id,
            transaction.transaction_type,
            transaction.amount,
            &transaction.category,
            &transaction.description,
            transaction.transaction_date,
            timestamp_to_sql(transaction.created_at)?,
        ),
    )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: &str, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, transaction_type, amount, category, description, transaction_date, created_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve up to [TRANSACTION_FETCH_LIMIT] transactions, newest date first.
///
/// With a `month`, only transactions whose date string starts with it are
/// returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions(
    month: Option<&Month>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let prefix = month.map(|month| month.as_ref());

    connection
        .prepare(
            "SELECT id, transaction_type, amount, category, description, transaction_date, created_at
             FROM \"transaction\"
             WHERE ?1 IS NULL OR substr(transaction_date, 1, length(?1)) = ?1
             ORDER BY transaction_date DESC, created_at DESC
             LIMIT ?2",
        )?
        .query_map((prefix, TRANSACTION_FETCH_LIMIT), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Get the number of transactions whose category is `category_name`.
pub fn count_transactions_in_category(
    category_name: &str,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE category = ?1;",
            [category_name],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Delete a transaction by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id TEXT PRIMARY KEY NOT NULL,
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                description TEXT,
                transaction_date TEXT NOT NULL,
                created_at TEXT NOT NULL
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(transaction_date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let transaction_type = row.get(1)?;
    let amount = row.get(2)?;
    let category = row.get(3)?;
    let description = row.get(4)?;
    let transaction_date = row.get(5)?;
    let created_at = timestamp_from_row(row, 6)?;

    Ok(Transaction {
        id,
        transaction_type,
        amount,
        category,
        description,
        transaction_date,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
