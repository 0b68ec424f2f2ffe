#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue},
    response::Response,
};
use axum_test::TestServer;

use crate::{AppState, DatabaseClient, TENANT_HEADER, TenantName, build_router};

/// A server over in-memory storage whose default database is `FinTraQ`.
pub(crate) fn get_test_server() -> TestServer {
    let client = DatabaseClient::open_in_memory(
        TenantName::new("FinTraQ").expect("Could not create tenant name"),
    )
    .expect("Could not open in-memory storage");
    let state =
        AppState::new(Arc::new(client), "Etc/UTC").expect("Could not create app state");

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// The header that selects the tenant `name`.
pub(crate) fn tenant_header(name: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(TENANT_HEADER),
        HeaderValue::from_str(name).expect("Could not create header value"),
    )
}

pub(crate) async fn parse_json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}
