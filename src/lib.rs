//! FinTraQ is a backend for tracking personal income and expenses.
//!
//! This library provides a multi-tenant JSON REST API over categories and
//! transactions, plus monthly summaries. The tenant database for a request is
//! chosen with the [TENANT_HEADER] header, falling back to the default
//! database when the header is absent.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod category;
mod cors;
mod database;
mod endpoints;
mod lifecycle;
mod logging;
mod not_found;
mod routing;
mod seed;
mod summary;
mod tenant;
mod timezone;
mod transaction;
mod transaction_type;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use cors::{build_cors_layer, parse_origins};
pub use database::{Database, DatabaseClient, StorageLocation};
pub use lifecycle::{shutdown, startup};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use seed::{SeedReport, seed_all, seed_categories, seed_transactions};
pub use tenant::{DEFAULT_DATABASE_NAME, TENANT_HEADER, TenantName};
pub use timezone::today_in;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The tenant header contained characters other than ASCII letters,
    /// digits, `-` and `_`, or was too long.
    #[error("Invalid tenant database name")]
    InvalidTenantIdentifier(String),

    /// A month string did not have the form `YYYY-MM`.
    #[error("Invalid month format \"{0}\". Use YYYY-MM")]
    InvalidMonthFormat(String),

    /// A category with the same name and type already exists.
    #[error("Category with this name and type already exists")]
    DuplicateCategory,

    /// The category is referenced by at least one transaction.
    ///
    /// Transactions reference categories by name, so this check matches on
    /// the name alone.
    #[error("Cannot delete category that is being used in transactions")]
    CategoryInUse,

    /// A transaction named a category that does not exist.
    #[error("Category \"{0}\" does not exist")]
    UnknownCategory(String),

    /// A category name was empty or longer than 50 characters.
    #[error("Category name must be between 1 and 50 characters long")]
    InvalidCategoryName,

    /// A category or transaction type was something other than `income` or
    /// `expense`.
    #[error("Type must be 'income' or 'expense', got \"{0}\"")]
    InvalidTransactionType(String),

    /// A transaction amount was zero, negative or not a finite number.
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(f64),

    /// The request body could not be parsed.
    #[error("Invalid request body: {0}")]
    InvalidJson(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a category that does not exist.
    #[error("Category not found")]
    DeleteMissingCategory,

    /// Tried to delete a transaction that does not exist.
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected storage error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire a database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The storage location could not be prepared, e.g. the directory could
    /// not be created.
    #[error("could not set up storage: {0}")]
    StorageSetup(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("category.name") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidTenantIdentifier(_)
            | Error::InvalidMonthFormat(_)
            | Error::DuplicateCategory
            | Error::CategoryInUse
            | Error::UnknownCategory(_)
            | Error::InvalidCategoryName
            | Error::InvalidTransactionType(_)
            | Error::InvalidAmount(_)
            | Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::DeleteMissingCategory | Error::DeleteMissingTransaction => {
                StatusCode::NOT_FOUND
            }
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::StorageSetup(_)
            | Error::InvalidTimezone(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
