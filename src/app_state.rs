//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{Error, database::DatabaseClient, timezone::get_local_offset};

/// The state of the REST server.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The storage client that hands out tenant databases.
    pub database_client: Arc<DatabaseClient>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if `local_timezone` is not a known timezone.
    pub fn new(database_client: Arc<DatabaseClient>, local_timezone: &str) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezone(local_timezone.to_owned()));
        }

        Ok(Self {
            database_client,
            local_timezone: local_timezone.to_owned(),
        })
    }
}

// this impl tells the tenant extractor how to access the client from our state
impl FromRef<AppState> for Arc<DatabaseClient> {
    fn from_ref(state: &AppState) -> Self {
        state.database_client.clone()
    }
}
