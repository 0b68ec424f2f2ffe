//! Monthly income, expense and balance totals.

use axum::{Json, extract::Path};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    tenant::TenantDatabase,
    transaction::{Month, Transaction, get_transactions},
    transaction_type::TransactionType,
};

/// The totals for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// Always `total_income - total_expenses`.
    pub balance: f64,
    pub month: String,
}

/// Sum `transactions` by type.
///
/// The transactions are expected to already be filtered to `month`.
pub fn summarize(month: &Month, transactions: &[Transaction]) -> MonthlySummary {
    let total_for = |transaction_type: TransactionType| -> f64 {
        transactions
            .iter()
            .filter(|transaction| transaction.transaction_type == transaction_type)
            .map(|transaction| transaction.amount)
            .sum()
    };

    let total_income = total_for(TransactionType::Income);
    let total_expenses = total_for(TransactionType::Expense);

    MonthlySummary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        month: month.to_string(),
    }
}

/// Fetch the transactions in `month` and sum them.
pub fn get_monthly_summary(month: &Month, connection: &Connection) -> Result<MonthlySummary, Error> {
    let transactions = get_transactions(Some(month), connection)?;

    Ok(summarize(month, &transactions))
}

/// Route handler for the summary of one month.
pub async fn get_monthly_summary_endpoint(
    TenantDatabase(database): TenantDatabase,
    Path(month): Path<String>,
) -> Result<Json<MonthlySummary>, Error> {
    let month = Month::new(&month)?;
    let connection = database.lock()?;

    get_monthly_summary(&month, &connection).map(Json)
}
