//! Maps an incoming request to the database of the tenant it names.

use std::{fmt::Display, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use serde::Serialize;

use crate::{
    Error,
    database::{Database, DatabaseClient},
};

/// The request header naming the tenant database, `X-Tenant-DB`.
pub const TENANT_HEADER: &str = "x-tenant-db";

/// The name of the default database when none is configured.
pub const DEFAULT_DATABASE_NAME: &str = "FinTraQ";

/// The longest accepted tenant name.
const MAX_TENANT_NAME_LENGTH: usize = 64;

/// A validated tenant database name.
///
/// Only ASCII letters, digits, `-` and `_` are allowed, so a name is always
/// safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TenantName(String);

impl TenantName {
    /// Create a tenant name.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTenantIdentifier] if `name` is empty, longer
    /// than 64 characters or contains a character outside the whitelist.
    pub fn new(name: &str) -> Result<Self, Error> {
        let is_valid = !name.is_empty()
            && name.len() <= MAX_TENANT_NAME_LENGTH
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if is_valid {
            Ok(Self(name.to_owned()))
        } else {
            Err(Error::InvalidTenantIdentifier(name.to_owned()))
        }
    }
}

impl AsRef<str> for TenantName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TenantName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve an optional tenant identifier to a database handle.
///
/// An absent or empty identifier selects the default database.
///
/// # Errors
///
/// Returns [Error::InvalidTenantIdentifier] for a malformed identifier, or an
/// error from opening the tenant database.
pub fn resolve(client: &DatabaseClient, tenant: Option<&str>) -> Result<Database, Error> {
    match tenant {
        None | Some("") => Ok(client.default_database().clone()),
        Some(raw_name) => {
            let name = TenantName::new(raw_name)?;
            client.database(&name)
        }
    }
}

fn tenant_from_headers(headers: &HeaderMap) -> Result<Option<&str>, Error> {
    headers
        .get(TENANT_HEADER)
        .map(|value| {
            value.to_str().map_err(|_| {
                Error::InvalidTenantIdentifier(String::from_utf8_lossy(value.as_bytes()).into())
            })
        })
        .transpose()
}

/// Extractor for the database selected by the [TENANT_HEADER] header.
///
/// Handlers take `TenantDatabase(database): TenantDatabase` to receive the
/// handle. Requests with an invalid header are rejected before the handler
/// runs.
#[derive(Debug, Clone)]
pub struct TenantDatabase(pub Database);

impl<S> FromRequestParts<S> for TenantDatabase
where
    S: Send + Sync,
    Arc<DatabaseClient>: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let client = Arc::<DatabaseClient>::from_ref(state);
        let tenant = tenant_from_headers(&parts.headers)?;

        resolve(&client, tenant).map(TenantDatabase)
    }
}
