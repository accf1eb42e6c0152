// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fatal error taxonomy for the workflow run.
//!
//! Soft failures (degraded collection fetches, failed correction or trigger
//! PUTs) never surface here; they are carried in the run report. Everything
//! in this module stops the run immediately.

use crate::config::ConfigError;
use crate::http::{AuthError, HttpError};
use crate::model::ParseError;

/// The target virtual service could not be created.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("virtual service create rejected: status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("created virtual service record has no id")]
    MissingId,

    #[error("seeding failed: {0}")]
    Http(#[from] HttpError),
}

/// Fatal conditions that abort the run before a verdict can be produced.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    /// The resolved target record was unusable (e.g. no id to re-fetch by).
    #[error("unusable virtual service record: {0}")]
    Target(#[from] ParseError),

    /// The by-id re-fetch before the trigger failed.
    #[error("failed to fetch virtual service {id}: {reason}")]
    TargetFetch { id: String, reason: String },

    /// Transport-level failure during a stage that cannot degrade.
    #[error("transport failure during {stage}: {source}")]
    Transport {
        stage: &'static str,
        #[source]
        source: HttpError,
    },
}

impl RunError {
    /// Machine-readable outcome: 2 config, 3 auth, 4 seed, 5 any mid-run
    /// fetch or transport abort.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => 2,
            RunError::Auth(_) => 3,
            RunError::Seed(_) => 4,
            RunError::Target(_) | RunError::TargetFetch { .. } | RunError::Transport { .. } => 5,
        }
    }
}
