//! The storage client: one SQLite database per tenant, opened on demand and
//! cached for the lifetime of the process.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, Row, types::Type};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error, category::create_category_table, tenant::TenantName,
    transaction::create_transaction_table,
};

/// The file extension used for tenant database files.
const DATABASE_FILE_EXTENSION: &str = "sqlite3";

/// The connection string that keeps every tenant database in memory.
pub const IN_MEMORY: &str = ":memory:";

/// Where tenant databases live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Each tenant database is a file in this directory.
    Directory(PathBuf),
    /// Each tenant database is a private in-memory database.
    InMemory,
}

impl StorageLocation {
    /// Parse a connection string.
    ///
    /// [IN_MEMORY] selects [StorageLocation::InMemory], anything else is
    /// treated as a directory path.
    pub fn from_connection_string(connection_string: &str) -> Self {
        match connection_string.trim() {
            IN_MEMORY => StorageLocation::InMemory,
            path => StorageLocation::Directory(PathBuf::from(path)),
        }
    }

    fn open(&self, name: &TenantName) -> Result<Connection, rusqlite::Error> {
        match self {
            StorageLocation::InMemory => Connection::open_in_memory(),
            StorageLocation::Directory(directory) => {
                Connection::open(database_path(directory, name))
            }
        }
    }
}

fn database_path(directory: &Path, name: &TenantName) -> PathBuf {
    directory.join(format!("{}.{DATABASE_FILE_EXTENSION}", name.as_ref()))
}

/// A handle to one tenant database.
///
/// Cloning the handle is cheap and every clone shares the same connection.
#[derive(Debug, Clone)]
pub struct Database {
    name: TenantName,
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Wrap a connection, creating the tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be created.
    pub fn new(name: TenantName, connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            name,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// The name of the tenant this database belongs to.
    pub fn name(&self) -> &TenantName {
        &self.name
    }

    /// Acquire exclusive access to the connection.
    ///
    /// Store operations hold the guard for their whole check-then-write
    /// sequence, so those sequences never interleave within one process.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the lock is poisoned.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire lock for database {}: {error}", self.name);
            Error::DatabaseLockError
        })
    }

    /// Run a trivial query to check that the database is reachable.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned or the query fails.
    pub fn ping(&self) -> Result<(), Error> {
        let connection = self.lock()?;
        connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

        Ok(())
    }

    /// Close the connection, returning the name and the error on failure.
    ///
    /// If other clones of this handle are still alive the connection is
    /// released when the last one is dropped instead.
    pub(crate) fn close(self) -> Result<(), (TenantName, String)> {
        let name = self.name;

        match Arc::try_unwrap(self.connection) {
            Ok(mutex) => {
                let connection = mutex
                    .into_inner()
                    .map_err(|error| (name.clone(), error.to_string()))?;

                connection
                    .close()
                    .map_err(|(_, error)| (name, error.to_string()))
            }
            Err(_) => Err((
                name,
                "connection is still in use and will be released when dropped".to_owned(),
            )),
        }
    }
}

/// The storage client shared by all requests.
///
/// Holds the default database, opened at construction, and a cache of tenant
/// databases that are opened the first time they are requested. The cache is
/// never evicted.
#[derive(Debug)]
pub struct DatabaseClient {
    location: StorageLocation,
    default_database: Database,
    tenants: Mutex<HashMap<TenantName, Database>>,
}

impl DatabaseClient {
    /// Open the storage at `location` and its default database.
    ///
    /// For [StorageLocation::Directory] the directory is created if missing.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the default
    /// database cannot be opened and initialized.
    pub fn open(location: StorageLocation, default_name: TenantName) -> Result<Self, Error> {
        if let StorageLocation::Directory(directory) = &location {
            fs::create_dir_all(directory).map_err(|error| {
                Error::StorageSetup(format!(
                    "could not create directory {}: {error}",
                    directory.display()
                ))
            })?;
        }

        let connection = location.open(&default_name)?;
        let default_database = Database::new(default_name, connection)?;

        Ok(Self {
            location,
            default_database,
            tenants: Mutex::new(HashMap::new()),
        })
    }

    /// Open a client with every database kept in memory.
    ///
    /// # Errors
    /// Returns an error if the default database cannot be initialized.
    pub fn open_in_memory(default_name: TenantName) -> Result<Self, Error> {
        Self::open(StorageLocation::InMemory, default_name)
    }

    /// The database used when a request names no tenant.
    pub fn default_database(&self) -> &Database {
        &self.default_database
    }

    /// Get the database for `name`, opening and caching it on first use.
    ///
    /// Naming the default database returns the default handle.
    ///
    /// # Errors
    /// Returns an error if the cache lock is poisoned or the database cannot
    /// be opened.
    pub fn database(&self, name: &TenantName) -> Result<Database, Error> {
        if name == self.default_database.name() {
            return Ok(self.default_database.clone());
        }

        let mut tenants = self.tenants.lock().map_err(|error| {
            tracing::error!("could not acquire the tenant cache lock: {error}");
            Error::DatabaseLockError
        })?;

        if let Some(database) = tenants.get(name) {
            return Ok(database.clone());
        }

        tracing::info!("Opening database for tenant {name}");
        let connection = self.location.open(name)?;
        let database = Database::new(name.clone(), connection)?;
        tenants.insert(name.clone(), database.clone());

        Ok(database)
    }

    /// Close every database, returning the failures.
    pub(crate) fn close_all(self) -> Vec<(TenantName, String)> {
        let tenants = match self.tenants.into_inner() {
            Ok(tenants) => tenants,
            Err(poisoned) => poisoned.into_inner(),
        };

        std::iter::once(self.default_database)
            .chain(tenants.into_values())
            .filter_map(|database| database.close().err())
            .collect()
    }
}

/// Create the tables for the domain models if they do not exist.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Format a timestamp as an RFC 3339 string for storage.
pub(crate) fn timestamp_to_sql(timestamp: OffsetDateTime) -> Result<String, rusqlite::Error> {
    timestamp
        .format(&Rfc3339)
        .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))
}

/// Read an RFC 3339 timestamp from column `index` of `row`.
pub(crate) fn timestamp_from_row(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let raw: String = row.get(index)?;

    OffsetDateTime::parse(&raw, &Rfc3339).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

#[cfg(test)]
mod database_client_tests {
    use std::{
        env, fs,
        time::{SystemTime, UNIX_EPOCH},
    };

    use crate::{
        category::{CategoryName, create_category, get_all_categories},
        database::{DatabaseClient, StorageLocation},
        tenant::TenantName,
        transaction_type::TransactionType,
    };

    fn tenant(name: &str) -> TenantName {
        TenantName::new(name).expect("Could not create tenant name")
    }

    fn get_test_client() -> DatabaseClient {
        DatabaseClient::open_in_memory(tenant("FinTraQ")).expect("Could not open client")
    }

    #[test]
    fn parses_connection_strings() {
        assert_eq!(
            StorageLocation::from_connection_string(":memory:"),
            StorageLocation::InMemory
        );
        assert_eq!(
            StorageLocation::from_connection_string("/var/lib/fintraq"),
            StorageLocation::Directory("/var/lib/fintraq".into())
        );
    }

    #[test]
    fn default_database_responds_to_ping() {
        let client = get_test_client();

        assert_eq!(client.default_database().ping(), Ok(()));
    }

    #[test]
    fn naming_the_default_database_returns_the_default_handle() {
        let client = get_test_client();
        let default = client.default_database();
        create_category(
            CategoryName::new("Rent").unwrap(),
            TransactionType::Expense,
            &default.lock().unwrap(),
        )
        .unwrap();

        let database = client.database(&tenant("FinTraQ")).unwrap();

        let categories = get_all_categories(&database.lock().unwrap()).unwrap();
        assert_eq!(categories.len(), 1);
    }

    #[test]
    fn tenant_databases_are_isolated() {
        let client = get_test_client();
        let acme = client.database(&tenant("acme")).unwrap();
        let globex = client.database(&tenant("globex")).unwrap();

        create_category(
            CategoryName::new("Consulting").unwrap(),
            TransactionType::Income,
            &acme.lock().unwrap(),
        )
        .unwrap();

        assert_eq!(get_all_categories(&acme.lock().unwrap()).unwrap().len(), 1);
        assert!(get_all_categories(&globex.lock().unwrap()).unwrap().is_empty());
        assert!(
            get_all_categories(&client.default_database().lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn tenant_handles_are_cached() {
        let client = get_test_client();
        let first = client.database(&tenant("acme")).unwrap();
        create_category(
            CategoryName::new("Consulting").unwrap(),
            TransactionType::Income,
            &first.lock().unwrap(),
        )
        .unwrap();

        let second = client.database(&tenant("acme")).unwrap();

        assert_eq!(get_all_categories(&second.lock().unwrap()).unwrap().len(), 1);
    }

    #[test]
    fn directory_storage_creates_one_file_per_tenant() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let directory = env::temp_dir().join(format!("fintraq-test-{nanos}"));

        let client = DatabaseClient::open(
            StorageLocation::Directory(directory.clone()),
            tenant("FinTraQ"),
        )
        .expect("Could not open directory storage");
        client.database(&tenant("acme")).unwrap();

        assert!(directory.join("FinTraQ.sqlite3").is_file());
        assert!(directory.join("acme.sqlite3").is_file());

        assert!(client.close_all().is_empty());
        fs::remove_dir_all(directory).unwrap();
    }
}
