// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire records exchanged with the management API.
//!
//! The remote API delivers loosely-structured JSON objects; the fields the
//! workflow depends on (`id`, `name`, `enabled`, `ip_address`) are modelled
//! as explicit optionals and validated at the point of use, while any other
//! attributes are preserved untouched in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A required field was absent from a record the workflow depends on.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("record is missing required field `{field}`")]
    MissingField { field: &'static str },
}

/// Tenant record. Only observed during discovery; never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct Tenant {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Service-engine record. Only observed during discovery; never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEngine {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Virtual-service record, the object under test.
#[derive(Debug, Clone, Deserialize)]
pub struct VirtualService {
    pub id: Option<String>,
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub ip_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VirtualService {
    /// Returns the record id, the stable handle used by every stage after
    /// resolution.
    pub fn require_id(&self) -> Result<&str, ParseError> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ParseError::MissingField { field: "id" })
    }
}

/// Returns the first record in fetch order whose name matches `name`.
///
/// Names are assumed unique by contract; when duplicates occur anyway the
/// first-encountered record wins, deterministically.
pub fn find_by_name<'a>(records: &'a [VirtualService], name: &str) -> Option<&'a VirtualService> {
    records.iter().find(|vs| vs.name.as_deref() == Some(name))
}

/// Payload used to seed a missing target virtual service.
#[derive(Debug, Serialize)]
pub struct SeedRequest<'a> {
    pub name: &'a str,
    pub ip_address: &'a str,
    pub enabled: bool,
}

/// Payload for the `enabled` state updates (correction and trigger).
#[derive(Debug, Serialize)]
pub struct EnabledUpdate {
    pub enabled: bool,
}
