//! Transactions record money earned or spent against a category.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod month;

pub use core::{
    TRANSACTION_FETCH_LIMIT, Transaction, TransactionBuilder, TransactionId, count_transactions,
    count_transactions_in_category, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, get_transactions, map_transaction_row,
};
pub(crate) use core::insert_transaction;
pub use create_endpoint::{CreateTransactionState, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use month::Month;
