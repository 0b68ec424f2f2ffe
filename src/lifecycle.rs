//! Opening and closing the storage client around the lifetime of the server.

use std::sync::Arc;

use crate::{
    Error,
    database::{DatabaseClient, StorageLocation},
    tenant::TenantName,
};

/// Open the storage at `connection_string` and check that its default
/// database, `default_database`, responds.
///
/// `connection_string` is either `:memory:` or a directory that holds one
/// database file per tenant.
///
/// # Errors
/// Returns an error if `default_database` is not a valid tenant name, the
/// storage cannot be opened or the ping fails.
pub fn startup(connection_string: &str, default_database: &str) -> Result<DatabaseClient, Error> {
    let default_name = TenantName::new(default_database)?;
    let location = StorageLocation::from_connection_string(connection_string);

    let client = DatabaseClient::open(location, default_name).inspect_err(|error| {
        tracing::error!("Failed to open storage at {connection_string}: {error}");
    })?;

    client.default_database().ping().inspect_err(|error| {
        tracing::error!("Failed to ping database {default_database}: {error}");
    })?;

    tracing::info!("Connected to storage and ping successful");

    Ok(client)
}

/// Release every open database.
///
/// Failures are logged and otherwise ignored. If other references to the
/// client are still alive the databases are released when the last one is
/// dropped.
pub fn shutdown(client: Arc<DatabaseClient>) {
    let client = match Arc::try_unwrap(client) {
        Ok(client) => client,
        Err(_) => {
            tracing::warn!("Storage client is still in use, skipping explicit close");
            return;
        }
    };

    for (name, error) in client.close_all() {
        tracing::warn!("Could not close database {name}: {error}");
    }

    tracing::info!("Storage connections closed");
}

#[cfg(test)]
mod lifecycle_tests {
    use std::sync::Arc;

    use crate::{
        Error,
        lifecycle::{shutdown, startup},
    };

    #[test]
    fn startup_opens_in_memory_storage() {
        let client = startup(":memory:", "FinTraQ").expect("Could not start up");

        assert_eq!(client.default_database().name().as_ref(), "FinTraQ");
    }

    #[test]
    fn startup_rejects_invalid_default_name() {
        let result = startup(":memory:", "not valid");

        assert!(matches!(result, Err(Error::InvalidTenantIdentifier(_))));
    }

    #[test]
    fn shutdown_tolerates_shared_clients() {
        let client = Arc::new(startup(":memory:", "FinTraQ").unwrap());
        let other = client.clone();

        shutdown(client);

        assert!(other.default_database().ping().is_ok());
        shutdown(other);
    }
}
