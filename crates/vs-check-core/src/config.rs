// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Run configuration loaded from a TOML file.
//!
//! The configuration is a single read-only record consumed at startup: base
//! URL, credentials, endpoint paths, and the target virtual-service name. A
//! missing or unparsable file aborts the run before any network call.

use std::path::Path;

use serde::Deserialize;

/// Errors raised while loading the run configuration. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Top-level run configuration (`config.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub api: ApiConfig,
    pub user: UserConfig,
    pub workflow: WorkflowConfig,
}

/// Control-plane location and endpoint paths.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub endpoints: Endpoints,
}

/// Endpoint paths relative to `base_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    pub login: String,
    pub tenant: String,
    pub service_engine: String,
    pub virtual_service: String,
}

/// Operator credentials presented at login.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
}

/// Workflow parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Name of the virtual service the run operates on.
    pub target_vs_name: String,
}

impl RunConfig {
    /// Loads and parses the configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;
        let mut config: RunConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                source: e,
            })?;
        // Endpoint paths are joined onto the base URL verbatim; a trailing
        // slash here would produce `//login`-style paths.
        while config.api.base_url.ends_with('/') {
            config.api.base_url.pop();
        }
        Ok(config)
    }
}
