// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! End-to-end verification workflow for a virtual-service management API.
//!
//! The workflow authenticates against the appliance control plane, discovers
//! tenants, service engines, and virtual services, locates (or seeds) a
//! target virtual service, disables it through the API, and verifies the
//! `enabled` attribute converged. Control flows strictly forward through the
//! stages; each stage consumes the identifiers produced by the previous one.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod fetch;
pub mod http;
pub mod model;
pub mod register;
pub mod report;
pub mod workflow;

pub use config::{ConfigError, RunConfig};
pub use error::{RunError, SeedError};
pub use http::{ApiSession, ApiTransport, AuthError, HttpError};
pub use model::{find_by_name, ParseError, ServiceEngine, Tenant, VirtualService};
pub use register::{register_operator, RegisterError, RegisteredUser};
pub use report::{Precondition, RunReport, SoftFailure, Verdict};
