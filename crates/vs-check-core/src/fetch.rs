// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Collection fetches with soft-failure semantics.
//!
//! A non-200 on a collection read degrades to an empty collection so the
//! downstream "not found" logic behaves identically whether the call failed
//! or legitimately returned nothing. Transport failures and unparsable 200
//! bodies remain hard errors.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::http::{json_body, ApiSession, HttpError};

/// A fetched value plus an optional marker describing why it is degraded.
#[derive(Debug)]
pub struct Fetched<T> {
    pub value: T,
    pub degraded: Option<String>,
}

impl<T> Fetched<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            degraded: None,
        }
    }
}

/// Fetches a collection endpoint, substituting an empty collection for any
/// non-200 response.
pub async fn fetch_collection<T: DeserializeOwned>(
    session: &ApiSession,
    endpoint: &str,
    resource: &'static str,
) -> Result<Fetched<Vec<T>>, HttpError> {
    let response = session.get(endpoint, None).await?;
    let status = response.status();
    if status != StatusCode::OK {
        warn!(
            resource,
            status = status.as_u16(),
            "collection fetch failed, continuing with an empty collection"
        );
        return Ok(Fetched {
            value: Vec::new(),
            degraded: Some(format!("status {}", status.as_u16())),
        });
    }

    let records: Vec<T> = json_body(response).await?;
    info!(resource, count = records.len(), "fetched collection");
    Ok(Fetched::clean(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tenant;
    use httptest::{matchers::request, responders::status_code, Expectation, Server};

    async fn session(server: &Server) -> ApiSession {
        server.expect(
            Expectation::matching(request::method_path("POST", "/login"))
                .respond_with(status_code(200).body(r#"{"token":"t"}"#)),
        );
        let base_url = server.url_str("").trim_end_matches('/').to_string();
        crate::http::ApiTransport::new(base_url)
            .expect("transport should build")
            .login("/login", "admin", "hunter2")
            .await
            .expect("login should succeed")
    }

    #[tokio::test]
    async fn ok_response_parses_records() {
        let server = Server::run();
        let session = session(&server).await;
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/tenant")).respond_with(
                status_code(200).body(r#"[{"id":"t1","name":"admin"},{"id":"t2"}]"#),
            ),
        );

        let fetched = fetch_collection::<Tenant>(&session, "/api/tenant", "tenant")
            .await
            .expect("fetch should succeed");
        assert_eq!(fetched.value.len(), 2);
        assert!(fetched.degraded.is_none());
    }

    #[tokio::test]
    async fn non_200_degrades_to_empty_collection() {
        let server = Server::run();
        let session = session(&server).await;
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/tenant"))
                .respond_with(status_code(503).body("upstream down")),
        );

        let fetched = fetch_collection::<Tenant>(&session, "/api/tenant", "tenant")
            .await
            .expect("soft failure must not propagate");
        assert!(fetched.value.is_empty());
        assert_eq!(fetched.degraded.as_deref(), Some("status 503"));
    }

    #[tokio::test]
    async fn unparsable_200_body_is_a_hard_error() {
        let server = Server::run();
        let session = session(&server).await;
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/tenant"))
                .respond_with(status_code(200).body("not json")),
        );

        let err = fetch_collection::<Tenant>(&session, "/api/tenant", "tenant")
            .await
            .expect_err("garbage body should fail");
        assert!(matches!(err, HttpError::Decode(_)));
    }
}
