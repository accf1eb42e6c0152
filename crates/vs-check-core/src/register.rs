// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Operator self-registration helper, independent of the main workflow.
//!
//! Generates throwaway credentials and posts them to the unauthenticated
//! `/register` endpoint; the operator copies the printed credentials into the
//! run configuration afterwards.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Password assigned to every registered operator account.
const REGISTER_PASSWORD: &str = "StrongPassword123!";

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("registration rejected: status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error during registration: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Credentials accepted by the remote API.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub username: String,
    pub password: String,
}

/// Generates a `user_<8 hex>` username with the fixed password.
fn generate_credentials() -> RegisteredUser {
    let hex = Uuid::new_v4().simple().to_string();
    RegisteredUser {
        username: format!("user_{}", &hex[..8]),
        password: REGISTER_PASSWORD.to_string(),
    }
}

/// Registers a fresh operator account against `{base_url}/register`.
pub async fn register_operator(base_url: &str) -> Result<RegisteredUser, RegisterError> {
    let user = generate_credentials();
    info!(username = %user.username, "registering operator account");

    let client = Client::builder().build()?;
    let response = client
        .post(format!("{base_url}/register"))
        .json(&user)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        let body = response.text().await.unwrap_or_default();
        return Err(RegisterError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    info!(username = %user.username, "registration accepted");
    Ok(user)
}
