// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The staged verification workflow.
//!
//! Control flows strictly forward: discovery → resolution/seeding →
//! precondition normalization → trigger → verification. Each stage consumes
//! the session and the identifiers produced by the previous stage; no stage
//! re-enters an earlier one, and once the target id is known no stage
//! re-resolves by name.

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::connectivity;
use crate::error::{RunError, SeedError};
use crate::fetch::fetch_collection;
use crate::http::{json_body, ApiSession, ApiTransport};
use crate::model::{
    find_by_name, EnabledUpdate, SeedRequest, ServiceEngine, Tenant, VirtualService,
};
use crate::report::{Precondition, RunReport, SoftFailure, Verdict};

/// Address given to seeded virtual services.
const SEED_IP_ADDRESS: &str = "10.10.10.10";

/// Hosts named by the simulated environment checks.
const LOAD_BALANCER_HOST: &str = "load-balancer-01";
const MANAGEMENT_HOST: &str = "management-server";

/// Runs the whole workflow and produces the final report.
///
/// Fatal conditions (config, login, seeding, a failed by-id fetch before the
/// trigger) abort with a [`RunError`]; everything else degrades into the
/// report's soft-failure list so the verifier can still produce a verdict.
pub async fn run(config: &RunConfig) -> Result<RunReport, RunError> {
    let transport =
        ApiTransport::new(config.api.base_url.clone()).map_err(|source| RunError::Transport {
            stage: "client setup",
            source,
        })?;
    let session = transport
        .login(
            &config.api.endpoints.login,
            &config.user.username,
            &config.user.password,
        )
        .await?;

    let mut soft_failures = Vec::new();

    info!("stage: discovery");
    let transport_err = |source| RunError::Transport {
        stage: "discovery",
        source,
    };
    let tenants = fetch_collection::<Tenant>(&session, &config.api.endpoints.tenant, "tenant")
        .await
        .map_err(transport_err)?;
    let engines = fetch_collection::<ServiceEngine>(
        &session,
        &config.api.endpoints.service_engine,
        "service_engine",
    )
    .await
    .map_err(transport_err)?;
    let services = fetch_collection::<VirtualService>(
        &session,
        &config.api.endpoints.virtual_service,
        "virtual_service",
    )
    .await
    .map_err(transport_err)?;
    for (resource, degraded) in [
        ("tenant", &tenants.degraded),
        ("service_engine", &engines.degraded),
        ("virtual_service", &services.degraded),
    ] {
        if let Some(reason) = degraded {
            soft_failures.push(SoftFailure::CollectionFetch {
                resource,
                reason: reason.clone(),
            });
        }
    }

    connectivity::simulate_ssh_connect(LOAD_BALANCER_HOST);
    connectivity::simulate_rdp_validation(MANAGEMENT_HOST);

    info!("stage: resolution");
    let vs_endpoint = &config.api.endpoints.virtual_service;
    let target_name = &config.workflow.target_vs_name;
    let (target_id, seeded) = match find_by_name(&services.value, target_name) {
        Some(record) => {
            info!(name = %target_name, "found target virtual service");
            (record.require_id()?.to_string(), false)
        }
        None => {
            info!(name = %target_name, "target virtual service not found, seeding it");
            let id = seed(&session, vs_endpoint, target_name).await?;
            (id, true)
        }
    };
    // From here on the target is addressed by id only.
    info!(id = %target_id, "target virtual service resolved");

    info!("stage: precondition");
    let (precondition, correction_failure) = normalize(&session, vs_endpoint, &target_id).await?;
    soft_failures.extend(correction_failure);

    info!("stage: trigger");
    soft_failures.extend(trigger_disable(&session, vs_endpoint, &target_id).await);

    info!("stage: verification");
    let verdict = verify_disabled(&session, vs_endpoint, &target_id).await;

    Ok(RunReport {
        target_id,
        seeded,
        precondition,
        verdict,
        soft_failures,
    })
}

/// Creates the target virtual service with default attributes. Invoked at
/// most once per run, only when resolution came up empty.
async fn seed(session: &ApiSession, endpoint: &str, name: &str) -> Result<String, SeedError> {
    let payload = SeedRequest {
        name,
        ip_address: SEED_IP_ADDRESS,
        enabled: true,
    };
    let response = session.post(endpoint, &payload).await?;
    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        let body = response.text().await.unwrap_or_default();
        return Err(SeedError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    let record: VirtualService = json_body(response).await?;
    let id = record.require_id().map_err(|_| SeedError::MissingId)?;
    info!(name, id, "seeded target virtual service");
    Ok(id.to_string())
}

/// Re-fetches the target by id. Returns the failure reason on any non-200 or
/// transport/decode error; fatality is the caller's decision.
async fn fetch_target(
    session: &ApiSession,
    endpoint: &str,
    id: &str,
) -> Result<VirtualService, String> {
    let path = format!("{endpoint}/{id}");
    let response = match session.get(&path, None).await {
        Ok(response) => response,
        Err(err) => return Err(err.to_string()),
    };
    let status = response.status();
    if status != StatusCode::OK {
        return Err(format!("status {}", status.as_u16()));
    }
    json_body::<VirtualService>(response)
        .await
        .map_err(|err| err.to_string())
}

/// Ensures the target is enabled before the trigger. The value from the
/// collection scan may be stale, so the target is always re-fetched by id; a
/// failed re-fetch aborts the run. A failed correction PUT is logged and the
/// run proceeds: the trigger attempts the opposite transition anyway and the
/// verifier catches a truly inconsistent end state.
async fn normalize(
    session: &ApiSession,
    endpoint: &str,
    id: &str,
) -> Result<(Precondition, Option<SoftFailure>), RunError> {
    let record = fetch_target(session, endpoint, id)
        .await
        .map_err(|reason| RunError::TargetFetch {
            id: id.to_string(),
            reason,
        })?;

    match record.enabled {
        Some(true) => {
            info!(id, "target already enabled, no correction needed");
            Ok((Precondition::VerifiedEnabled, None))
        }
        // `false` and absent/null both take the correction branch.
        observed => {
            warn!(id, ?observed, "target not enabled, correcting before the trigger");
            let path = format!("{endpoint}/{id}");
            match session.put(&path, &EnabledUpdate { enabled: true }).await {
                Ok(response) if response.status() == StatusCode::OK => {
                    info!(id, "precondition corrected to enabled");
                    Ok((Precondition::Corrected, None))
                }
                Ok(response) => {
                    let reason = format!("status {}", response.status().as_u16());
                    warn!(id, %reason, "correction rejected, proceeding anyway");
                    Ok((
                        Precondition::CorrectionFailed,
                        Some(SoftFailure::Normalization { reason }),
                    ))
                }
                Err(err) => {
                    let reason = err.to_string();
                    warn!(id, %reason, "correction failed, proceeding anyway");
                    Ok((
                        Precondition::CorrectionFailed,
                        Some(SoftFailure::Normalization { reason }),
                    ))
                }
            }
        }
    }
}

/// Issues the disable request. The server-reported state in the response is
/// logged as an optimistic read; authority belongs to the verifier. Failures
/// are recorded, not fatal.
async fn trigger_disable(session: &ApiSession, endpoint: &str, id: &str) -> Option<SoftFailure> {
    info!(id, "disabling virtual service");
    let path = format!("{endpoint}/{id}");
    match session.put(&path, &EnabledUpdate { enabled: false }).await {
        Ok(response) if response.status() == StatusCode::OK => {
            match json_body::<VirtualService>(response).await {
                Ok(record) => {
                    info!(id, server_enabled = ?record.enabled, "disable request accepted")
                }
                Err(_) => info!(id, "disable request accepted (unreadable response body)"),
            }
            None
        }
        Ok(response) => {
            let reason = format!("status {}", response.status().as_u16());
            warn!(id, %reason, "disable request failed");
            Some(SoftFailure::Trigger { reason })
        }
        Err(err) => {
            let reason = err.to_string();
            warn!(id, %reason, "disable request failed");
            Some(SoftFailure::Trigger { reason })
        }
    }
}

/// The sole authoritative check: one re-fetch, one comparison.
async fn verify_disabled(session: &ApiSession, endpoint: &str, id: &str) -> Verdict {
    match fetch_target(session, endpoint, id).await {
        Ok(record) => match record.enabled {
            Some(false) => {
                info!(id, "verified: virtual service is disabled");
                Verdict::Disabled
            }
            observed => {
                warn!(id, ?observed, "virtual service did not converge to disabled");
                Verdict::StillEnabled { observed }
            }
        },
        Err(reason) => {
            warn!(id, %reason, "unable to confirm final state");
            Verdict::Unconfirmed { reason }
        }
    }
}
