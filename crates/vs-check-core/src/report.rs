// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Final run report: the authoritative verdict plus every soft failure
//! recorded along the way, so "verified success" and "success despite
//! degraded stages" stay distinguishable.

use std::fmt;

/// Authoritative outcome of the post-condition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The target converged to `enabled == false`.
    Disabled,
    /// The target did not converge; carries the observed `enabled` value.
    StillEnabled { observed: Option<bool> },
    /// The final re-fetch failed; convergence could not be confirmed.
    Unconfirmed { reason: String },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Disabled => write!(f, "virtual service is disabled"),
            Verdict::StillEnabled { observed: Some(v) } => {
                write!(f, "virtual service did not converge (enabled is {v})")
            }
            Verdict::StillEnabled { observed: None } => {
                write!(f, "virtual service did not converge (enabled is absent)")
            }
            Verdict::Unconfirmed { reason } => {
                write!(f, "unable to confirm final state: {reason}")
            }
        }
    }
}

/// Terminal state of the precondition normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The target was already enabled; no correction issued.
    VerifiedEnabled,
    /// The target was not enabled and a correction PUT succeeded.
    Corrected,
    /// A correction was attempted but could not be confirmed.
    CorrectionFailed,
}

/// Non-fatal degradations recorded during the run.
#[derive(Debug, Clone)]
pub enum SoftFailure {
    /// A collection read returned non-200 and degraded to an empty collection.
    CollectionFetch {
        resource: &'static str,
        reason: String,
    },
    /// The precondition correction PUT failed.
    Normalization { reason: String },
    /// The disable PUT failed or returned non-200.
    Trigger { reason: String },
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoftFailure::CollectionFetch { resource, reason } => {
                write!(f, "{resource} collection fetch degraded: {reason}")
            }
            SoftFailure::Normalization { reason } => {
                write!(f, "precondition correction failed: {reason}")
            }
            SoftFailure::Trigger { reason } => write!(f, "disable request failed: {reason}"),
        }
    }
}

/// Everything the run learned, reported once at the end.
#[derive(Debug)]
pub struct RunReport {
    /// Stable id of the target virtual service.
    pub target_id: String,
    /// Whether the target had to be created for this run.
    pub seeded: bool,
    /// Terminal state of the precondition normalizer.
    pub precondition: Precondition,
    /// Authoritative post-condition verdict.
    pub verdict: Verdict,
    /// Soft failures recorded across all stages, in order.
    pub soft_failures: Vec<SoftFailure>,
}

impl RunReport {
    /// Whether the disable request itself failed at the trigger stage.
    pub fn trigger_failed(&self) -> bool {
        self.soft_failures
            .iter()
            .any(|failure| matches!(failure, SoftFailure::Trigger { .. }))
    }

    /// Overall success: the target converged *and* the tool's own disable
    /// request went through. A converged state the tool never successfully
    /// requested does not count.
    pub fn succeeded(&self) -> bool {
        self.verdict == Verdict::Disabled && !self.trigger_failed()
    }

    pub fn is_degraded(&self) -> bool {
        !self.soft_failures.is_empty()
    }

    /// Machine-readable outcome: 0 success, 1 failed to converge (or the
    /// trigger request failed), 6 convergence unconfirmed.
    pub fn exit_code(&self) -> u8 {
        match &self.verdict {
            Verdict::Disabled if !self.trigger_failed() => 0,
            Verdict::Disabled | Verdict::StillEnabled { .. } => 1,
            Verdict::Unconfirmed { .. } => 6,
        }
    }
}
