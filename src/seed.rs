//! Populates a fresh tenant database with the starter categories and,
//! optionally, a month of sample transactions.

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::{CategoryName, category_name_exists, insert_category},
    transaction::{Transaction, count_transactions, insert_transaction},
    transaction_type::TransactionType,
};

/// The categories every tenant starts with, in insertion order.
pub const PREDEFINED_CATEGORIES: [(&str, TransactionType); 17] = [
    ("Salary", TransactionType::Income),
    ("Freelance", TransactionType::Income),
    ("Investment", TransactionType::Income),
    ("Business", TransactionType::Income),
    ("Other Income", TransactionType::Income),
    ("Food & Dining", TransactionType::Expense),
    ("Transportation", TransactionType::Expense),
    ("Shopping", TransactionType::Expense),
    ("Entertainment", TransactionType::Expense),
    ("Bills & Utilities", TransactionType::Expense),
    ("Healthcare", TransactionType::Expense),
    ("Education", TransactionType::Expense),
    ("Travel", TransactionType::Expense),
    ("Home & Garden", TransactionType::Expense),
    ("Personal Care", TransactionType::Expense),
    ("Gifts & Donations", TransactionType::Expense),
    ("Other Expenses", TransactionType::Expense),
];

/// A sample transaction. `day` replaces the day of month of today's date,
/// `None` keeps today.
struct SampleTransaction {
    transaction_type: TransactionType,
    amount: f64,
    category: &'static str,
    description: &'static str,
    day: Option<u8>,
}

const SAMPLE_TRANSACTIONS: [SampleTransaction; 8] = [
    SampleTransaction {
        transaction_type: TransactionType::Income,
        amount: 5000.0,
        category: "Salary",
        description: "Monthly salary",
        day: None,
    },
    SampleTransaction {
        transaction_type: TransactionType::Income,
        amount: 800.0,
        category: "Freelance",
        description: "Web design project",
        day: Some(12),
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        amount: 1200.0,
        category: "Bills & Utilities",
        description: "Rent payment",
        day: Some(13),
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        amount: 350.0,
        category: "Food & Dining",
        description: "Groceries",
        day: Some(11),
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        amount: 80.0,
        category: "Transportation",
        description: "Gas & parking",
        day: Some(10),
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        amount: 120.0,
        category: "Entertainment",
        description: "Movie tickets",
        day: Some(9),
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        amount: 200.0,
        category: "Shopping",
        description: "Clothing",
        day: Some(8),
    },
    SampleTransaction {
        transaction_type: TransactionType::Income,
        amount: 300.0,
        category: "Investment",
        description: "Dividend payout",
        day: Some(7),
    },
];

/// How many records a seeding run inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// The number of predefined categories that were missing and got added.
    pub categories_inserted: usize,
    /// The number of sample transactions added.
    pub transactions_inserted: usize,
}

/// Insert each predefined category whose name is not already taken.
///
/// The existence check looks at the name only, so a same-named category of
/// the other type blocks that entry. Running this again once every entry
/// exists inserts nothing.
///
/// # Errors
/// Returns an error if a query fails, in which case nothing is inserted.
pub fn seed_categories(connection: &Connection) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;
    let created_at = OffsetDateTime::now_utc();
    let mut inserted = 0;

    for (name, category_type) in PREDEFINED_CATEGORIES {
        if category_name_exists(name, &transaction)? {
            continue;
        }

        insert_category(
            CategoryName::new_unchecked(name),
            category_type,
            created_at,
            &transaction,
        )?;
        tracing::debug!("Seeded category: {name}");
        inserted += 1;
    }

    transaction.commit()?;
    tracing::info!("Categories seeding completed, {inserted} added");

    Ok(inserted)
}

/// Insert the sample transactions, dated in the month of `today`, if the
/// database has no transactions at all.
///
/// # Errors
/// Returns an error if a query fails, in which case nothing is inserted.
pub fn seed_transactions(today: Date, connection: &Connection) -> Result<usize, Error> {
    let existing = count_transactions(connection)?;
    if existing > 0 {
        tracing::info!("Transactions already exist ({existing} found), skipping seed");
        return Ok(0);
    }

    let transaction = connection.unchecked_transaction()?;

    for sample in &SAMPLE_TRANSACTIONS {
        let date = match sample.day {
            Some(day) => today.replace_day(day).unwrap_or(today),
            None => today,
        };

        insert_transaction(
            Transaction::build(sample.transaction_type, sample.amount, sample.category, date)
                .description(Some(sample.description.to_owned())),
            &transaction,
        )?;
        tracing::debug!("Seeded transaction: {}", sample.description);
    }

    transaction.commit()?;
    tracing::info!(
        "Transactions seeding completed, {} added",
        SAMPLE_TRANSACTIONS.len()
    );

    Ok(SAMPLE_TRANSACTIONS.len())
}

/// Seed the categories, then the sample transactions.
///
/// Categories are always attempted, transactions only fill an empty table.
pub fn seed_all(today: Date, connection: &Connection) -> Result<SeedReport, Error> {
    let categories_inserted = seed_categories(connection)?;
    let transactions_inserted = seed_transactions(today, connection)?;

    Ok(SeedReport {
        categories_inserted,
        transactions_inserted,
    })
}

#[cfg(test)]
mod seed_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryName, count_categories, create_category, get_all_categories},
        database::initialize,
        seed::{PREDEFINED_CATEGORIES, SeedReport, seed_all, seed_categories, seed_transactions},
        transaction::{Transaction, count_transactions, create_transaction, get_transactions},
        transaction_type::TransactionType,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn taxonomy_has_five_income_and_twelve_expense_categories() {
        let income = PREDEFINED_CATEGORIES
            .iter()
            .filter(|(_, category_type)| *category_type == TransactionType::Income)
            .count();

        assert_eq!(income, 5);
        assert_eq!(PREDEFINED_CATEGORIES.len() - income, 12);
    }

    #[test]
    fn seed_categories_inserts_taxonomy_in_order() {
        let connection = get_test_db_connection();

        let inserted = seed_categories(&connection).unwrap();

        assert_eq!(inserted, 17);
        let names: Vec<String> = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();
        let want: Vec<String> = PREDEFINED_CATEGORIES
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        assert_eq!(names, want);
    }

    #[test]
    fn seed_categories_is_idempotent() {
        let connection = get_test_db_connection();
        seed_categories(&connection).unwrap();

        let inserted = seed_categories(&connection).unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(count_categories(&connection), Ok(17));
    }

    #[test]
    fn existing_name_of_other_type_blocks_that_entry() {
        let connection = get_test_db_connection();
        create_category(
            CategoryName::new_unchecked("Salary"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();

        let inserted = seed_categories(&connection).unwrap();

        assert_eq!(inserted, 16);
        let salary: Vec<_> = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .filter(|category| category.name.as_ref() == "Salary")
            .collect();
        assert_eq!(salary.len(), 1);
        assert_eq!(salary[0].category_type, TransactionType::Expense);
    }

    #[test]
    fn seed_transactions_fills_empty_table_relative_to_today() {
        let connection = get_test_db_connection();
        seed_categories(&connection).unwrap();
        let today = date!(2024 - 02 - 20);

        let inserted = seed_transactions(today, &connection).unwrap();

        assert_eq!(inserted, 8);
        let transactions = get_transactions(None, &connection).unwrap();
        assert_eq!(transactions.len(), 8);
        assert_eq!(transactions[0].transaction_date, today);
        assert!(
            transactions
                .iter()
                .any(|transaction| transaction.transaction_date == date!(2024 - 02 - 07))
        );
        assert!(
            transactions
                .iter()
                .all(|transaction| transaction.description.is_some())
        );
    }

    #[test]
    fn seed_transactions_skips_non_empty_table() {
        let connection = get_test_db_connection();
        seed_categories(&connection).unwrap();
        create_transaction(
            Transaction::build(TransactionType::Expense, 5.0, "Travel", date!(2024 - 01 - 01)),
            &connection,
        )
        .unwrap();

        let inserted = seed_transactions(date!(2024 - 02 - 20), &connection).unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(count_transactions(&connection), Ok(1));
    }

    #[test]
    fn seed_all_runs_both_once() {
        let connection = get_test_db_connection();
        let today = date!(2024 - 02 - 20);

        let first = seed_all(today, &connection).unwrap();
        let second = seed_all(today, &connection).unwrap();

        assert_eq!(
            first,
            SeedReport {
                categories_inserted: 17,
                transactions_inserted: 8
            }
        );
        assert_eq!(second, SeedReport::default());
    }
}
