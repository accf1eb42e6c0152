// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vs_check_core::config::RunConfig;
use vs_check_core::register;
use vs_check_core::workflow;

/// Disable-and-verify workflow runner for a virtual-service management API.
#[derive(Debug, Parser)]
#[command(name = "vs-check", version)]
struct Cli {
    /// Path to the run configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Register a fresh operator account instead of running the workflow.
    #[arg(long)]
    register: bool,

    /// Base URL override for --register when no config file is available.
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    if cli.register {
        return run_register(&cli).await;
    }

    let config = match RunConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!("configuration error: {err}");
            return ExitCode::from(2);
        }
    };
    info!(config = %cli.config.display(), "configuration loaded, starting workflow");

    match workflow::run(&config).await {
        Ok(report) => {
            for failure in &report.soft_failures {
                warn!("degraded stage: {failure}");
            }
            if report.seeded {
                info!(id = %report.target_id, "target was seeded for this run");
            }
            info!("verdict: {}", report.verdict);
            if report.succeeded() {
                if report.is_degraded() {
                    info!("run succeeded despite degraded stages");
                } else {
                    info!("run succeeded");
                }
            } else {
                error!("run failed");
            }
            ExitCode::from(report.exit_code())
        }
        Err(err) => {
            error!("run aborted: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Registration mode: base URL comes from the config file when it loads, or
/// from --base-url.
async fn run_register(cli: &Cli) -> ExitCode {
    let base_url = match &cli.base_url {
        Some(base_url) => base_url.trim_end_matches('/').to_string(),
        None => match RunConfig::from_file(&cli.config) {
            Ok(config) => config.api.base_url,
            Err(err) => {
                error!("--register needs --base-url or a loadable config file: {err}");
                return ExitCode::from(2);
            }
        },
    };

    match register::register_operator(&base_url).await {
        Ok(user) => {
            // The operator needs these verbatim to update the config file.
            println!("registered username: {}", user.username);
            println!("registered password: {}", user.password);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("registration failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let log_level = env::var("VS_CHECK_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());
    let env_filter = format!("h2=off,hyper=off,rustls=off,{log_level}");

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}
