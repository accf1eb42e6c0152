// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport for the management API.
//!
//! The transport comes in two states: [`ApiTransport`] (unauthenticated, can
//! only log in) and [`ApiSession`] (bearer token attached to every request).
//! Splitting the states makes "request sent without a token" unrepresentable
//! instead of a runtime check. Responses are returned uninterpreted; status
//! classification belongs to the workflow stages. No retries, no timeout
//! overrides beyond the client defaults.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Transport-level failures outside the login call.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Transport-level issue (DNS, TLS, socket, etc.).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response payload could not be decoded as the expected JSON shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Login failures. All of them are fatal for the run; there is no retry.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login rejected: status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("login response did not contain a token")]
    MissingToken,

    #[error("token is not a valid header value")]
    InvalidToken,

    #[error("transport error during login: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode login response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Body of a successful login response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Unauthenticated transport: a base URL and a reusable client.
#[derive(Debug, Clone)]
pub struct ApiTransport {
    client: Client,
    base_url: String,
}

impl ApiTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, HttpError> {
        let client = Client::builder().build().map_err(HttpError::Transport)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends credentials to the login endpoint and, on HTTP 200, promotes the
    /// transport into an authenticated session carrying the returned token.
    pub async fn login(
        self,
        login_endpoint: &str,
        username: &str,
        password: &str,
    ) -> Result<ApiSession, AuthError> {
        let url = format!("{}{}", self.base_url, login_endpoint);
        debug!(url = %url, username, "logging in");
        let response = self
            .client
            .post(&url)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let login: LoginResponse = serde_json::from_slice(&bytes)?;
        let token = login
            .token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| AuthError::InvalidToken)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!("login successful, token received");
        Ok(ApiSession {
            client: self.client,
            base_url: self.base_url,
            headers,
        })
    }
}

/// Authenticated session. Every request carries the bearer token and a JSON
/// content type; responses come back uninterpreted.
#[derive(Debug, Clone)]
pub struct ApiSession {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl ApiSession {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<Response, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.get(&url).headers(self.headers.clone());
        if let Some(pairs) = query {
            builder = builder.query(pairs);
        }
        self.dispatch("GET", &url, builder).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.put(&url).headers(self.headers.clone()).json(body);
        self.dispatch("PUT", &url, builder).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.post(&url).headers(self.headers.clone()).json(body);
        self.dispatch("POST", &url, builder).await
    }

    async fn dispatch(
        &self,
        method: &'static str,
        url: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<Response, HttpError> {
        debug!(
            method,
            url,
            headers = ?redact_headers(&self.headers),
            "api request"
        );
        let response = builder.send().await?;
        debug!(method, url, status = %response.status(), "api response");
        Ok(response)
    }
}

/// Reads the response body and decodes it as JSON.
pub async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Returns a redacted view of request headers suitable for debug logging.
fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let lower = name.as_str().to_ascii_lowercase();
            let display = if lower == "authorization" {
                "<redacted>".to_string()
            } else {
                value
                    .to_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| "<non-utf8>".to_string())
            };
            (lower, display)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::matchers::{all_of, contains, eq, json_decoded, key, not, request, url_decoded};
    use httptest::{responders::status_code, Expectation, Server};

    // base64("admin:hunter2"), the exact value reqwest sends for basic auth.
    const BASIC_ADMIN_HUNTER2: &str = "Basic YWRtaW46aHVudGVyMg==";

    fn transport(server: &Server) -> ApiTransport {
        let base_url = server.url_str("").trim_end_matches('/').to_string();
        ApiTransport::new(base_url).expect("transport should build")
    }

    #[tokio::test]
    async fn login_sends_basic_credentials_and_yields_bearer_session() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/login"),
                request::headers(contains(("authorization", BASIC_ADMIN_HUNTER2))),
            ])
            .respond_with(status_code(200).body(r#"{"token":"secret-token"}"#)),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/tenant"),
                request::headers(contains(("authorization", "Bearer secret-token"))),
                request::headers(contains(("content-type", "application/json"))),
            ])
            .respond_with(status_code(200).body("[]")),
        );

        let session = transport(&server)
            .login("/login", "admin", "hunter2")
            .await
            .expect("login should succeed");
        let response = session
            .get("/api/tenant", None)
            .await
            .expect("get should succeed");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_appends_query_parameters() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/login"))
                .respond_with(status_code(200).body(r#"{"token":"t"}"#)),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/virtualservice"),
                request::query(url_decoded(contains(("page", "1")))),
            ])
            .respond_with(status_code(200).body("[]")),
        );

        let session = transport(&server)
            .login("/login", "admin", "hunter2")
            .await
            .expect("login should succeed");
        let response = session
            .get("/api/virtualservice", Some(&[("page", "1")]))
            .await
            .expect("get should succeed");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_carries_basic_credentials_not_a_bearer_token() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/login"),
                request::headers(contains(("authorization", BASIC_ADMIN_HUNTER2))),
                request::headers(not(contains(("content-type", "application/json")))),
            ])
            .respond_with(status_code(200).body(r#"{"token":"t"}"#)),
        );

        transport(&server)
            .login("/login", "admin", "hunter2")
            .await
            .expect("login should succeed");
    }

    #[tokio::test]
    async fn rejected_login_is_an_auth_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/login"))
                .respond_with(status_code(401).body("bad credentials")),
        );

        let err = transport(&server)
            .login("/login", "admin", "wrong")
            .await
            .expect_err("login should fail");
        match err {
            AuthError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_body_without_token_is_an_auth_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/login"))
                .respond_with(status_code(200).body("{}")),
        );

        let err = transport(&server)
            .login("/login", "admin", "hunter2")
            .await
            .expect_err("login should fail");
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[tokio::test]
    async fn put_and_post_attach_token_and_json_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/login"))
                .respond_with(status_code(200).body(r#"{"token":"t"}"#)),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PUT", "/api/virtualservice/abc"),
                request::headers(contains(("authorization", "Bearer t"))),
                request::body(json_decoded(eq(serde_json::json!({"enabled": false})))),
            ])
            .respond_with(status_code(200).body("{}")),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/api/virtualservice"),
                request::headers(contains(key("authorization"))),
            ])
            .respond_with(status_code(201).body("{}")),
        );

        let session = transport(&server)
            .login("/login", "admin", "hunter2")
            .await
            .expect("login should succeed");
        let put = session
            .put("/api/virtualservice/abc", &serde_json::json!({"enabled": false}))
            .await
            .expect("put should succeed");
        assert_eq!(put.status(), StatusCode::OK);
        let post = session
            .post("/api/virtualservice", &serde_json::json!({"name": "vs"}))
            .await
            .expect("post should succeed");
        assert_eq!(post.status(), StatusCode::CREATED);
    }
}
