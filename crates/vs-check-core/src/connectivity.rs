// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Simulated environment connectivity checks. These never fail and touch no
//! network; they only log, standing in for the framework's real checks.

use tracing::info;

pub fn simulate_ssh_connect(host: &str) {
    info!(host, "simulated ssh connection established");
}

pub fn simulate_rdp_validation(host: &str) {
    info!(host, "simulated rdp validation successful");
}
