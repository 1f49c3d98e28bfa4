// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host resource inspection.

use async_trait::async_trait;
use tracing::debug;

use oz_core::HostSnapshot;

/// View of the host's capacity and GPU drivers.
#[async_trait]
pub trait HostInspector: Send + Sync {
    async fn snapshot(&self) -> HostSnapshot;

    /// Loaded GPU kernel drivers ("amdgpu", "nvidia").
    async fn gpu_drivers(&self) -> Vec<String>;
}

/// Inspector reading procfs and `lsmod`.
///
/// VRAM totals require vendor tooling and report as zero here; the
/// footprinter's vram delta is then zero, which the clamping in
/// [`HostSnapshot::usage_delta`] already tolerates.
#[derive(Clone, Default)]
pub struct ProcHost;

impl ProcHost {
    pub fn new() -> Self {
        Self
    }

    fn cpu_cores() -> f64 {
        std::thread::available_parallelism().map(|n| n.get() as f64).unwrap_or(1.0)
    }

    fn load_average() -> f64 {
        std::fs::read_to_string("/proc/loadavg")
            .ok()
            .and_then(|s| s.split_whitespace().next().and_then(|v| v.parse().ok()))
            .unwrap_or(0.0)
    }

    fn meminfo_gb(field: &str) -> f64 {
        let Ok(text) = std::fs::read_to_string("/proc/meminfo") else { return 0.0 };
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix(field) {
                let kb: f64 = rest
                    .trim_start_matches(':')
                    .split_whitespace()
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0);
                return kb / (1024.0 * 1024.0);
            }
        }
        0.0
    }
}

#[async_trait]
impl HostInspector for ProcHost {
    async fn snapshot(&self) -> HostSnapshot {
        let total_cpu = Self::cpu_cores();
        let available_cpu = (total_cpu - Self::load_average()).max(0.0);
        HostSnapshot {
            total_cpu_cores: total_cpu,
            available_cpu_cores: available_cpu,
            total_ram_gb: Self::meminfo_gb("MemTotal"),
            available_ram_gb: Self::meminfo_gb("MemAvailable"),
            total_vram_gb: 0.0,
            available_vram_gb: 0.0,
        }
    }

    async fn gpu_drivers(&self) -> Vec<String> {
        let output = match tokio::process::Command::new("lsmod").output().await {
            Ok(out) => String::from_utf8_lossy(&out.stdout).to_string(),
            Err(e) => {
                debug!(error = %e, "lsmod unavailable, assuming no GPU drivers");
                return Vec::new();
            }
        };

        let mut drivers = Vec::new();
        for line in output.lines() {
            if line.is_empty() || line.starts_with("Module") {
                continue;
            }
            match line.split_whitespace().next() {
                Some("amdgpu") => drivers.push("amdgpu".to_string()),
                Some("nvidia") => drivers.push("nvidia".to_string()),
                _ => {}
            }
        }
        debug!(?drivers, "detected GPU drivers");
        drivers
    }
}
