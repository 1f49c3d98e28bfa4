// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use std::path::PathBuf;
use std::time::Duration;

use crate::DaemonError;

/// Shared bearer secret for the control plane. Absence is fatal.
pub fn system_key() -> Result<String, DaemonError> {
    std::env::var("OZWALD_SYSTEM_KEY")
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(DaemonError::MissingSystemKey)
}

/// Catalog path: `OZWALD_CONFIG`, default `ozwald.yml`.
pub fn config_path() -> PathBuf {
    std::env::var("OZWALD_CONFIG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("ozwald.yml"))
}

/// Name of the provisioner entry this process runs as.
pub fn provisioner_name() -> Option<String> {
    std::env::var("OZWALD_PROVISIONER").ok().filter(|s| !s.is_empty())
}

/// Host identity, informational.
pub fn host_name() -> Option<String> {
    std::env::var("OZWALD_HOST").ok().filter(|s| !s.is_empty())
}

/// Usage-record file path. Required for the reconciler to run.
pub fn footprint_data_path() -> Result<PathBuf, DaemonError> {
    std::env::var("OZWALD_FOOTPRINT_DATA")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .ok_or(DaemonError::MissingFootprintPath)
}

/// Control-plane listen address, default `127.0.0.1:8000`.
pub fn bind_addr() -> String {
    std::env::var("OZWALD_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string())
}

fn duration_var(name: &str, default_secs: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(default_secs))
}

/// Idempotency window for duplicate start requests (default 3600 s).
pub fn service_start_timeout() -> Duration {
    duration_var("OZWALD_START_TIMEOUT_SECS", 3600)
}

/// Idempotency window for duplicate stop requests (default 3600 s).
pub fn service_stop_timeout() -> Duration {
    duration_var("OZWALD_STOP_TIMEOUT_SECS", 3600)
}
