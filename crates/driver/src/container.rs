// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic container-backed service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use oz_cache::RunnerLogsCache;
use oz_catalog::EffectiveDefinition;
use oz_core::{container_name, info_keys, ServiceInformation, ServiceStatus};

use crate::host::HostInspector;
use crate::registry::ProvisionableService;
use crate::runtime::{is_running, ContainerRuntime, DriverError};

/// Image references carry this prefix on the host.
const IMAGE_PREFIX: &str = "ozwald-";

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const POLL_DEADLINE: Duration = Duration::from_secs(30);

/// The builtin provisionable service: one container per instance.
pub struct ContainerService {
    runtime: Arc<dyn ContainerRuntime>,
    host: Arc<dyn HostInspector>,
    runner_logs: Option<RunnerLogsCache>,
    /// Optional (external, internal) port mapping.
    ports: Option<(u16, u16)>,
    volumes: Vec<String>,
    poll_interval: Duration,
    poll_deadline: Duration,
}

impl ContainerService {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, host: Arc<dyn HostInspector>) -> Self {
        Self {
            runtime,
            host,
            runner_logs: None,
            ports: None,
            volumes: Vec::new(),
            poll_interval: POLL_INTERVAL,
            poll_deadline: POLL_DEADLINE,
        }
    }

    /// Snapshot container logs into the runner-log cache after start.
    pub fn with_runner_logs(mut self, logs: RunnerLogsCache) -> Self {
        self.runner_logs = Some(logs);
        self
    }

    pub fn with_ports(mut self, external: u16, internal: u16) -> Self {
        self.ports = Some((external, internal));
        self
    }

    pub fn with_volumes(mut self, volumes: Vec<String>) -> Self {
        self.volumes = volumes;
        self
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_poll(mut self, interval: Duration, deadline: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_deadline = deadline;
        self
    }

    fn standard_options(&self, name: &str) -> Vec<String> {
        vec![
            "-d".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            name.to_string(),
        ]
    }

    async fn gpu_options(&self, effective: &EffectiveDefinition) -> Vec<String> {
        let requested = effective
            .environment
            .get("GPU")
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        if !requested {
            return Vec::new();
        }

        let mut opts = Vec::new();
        let drivers = self.host.gpu_drivers().await;
        if drivers.iter().any(|d| d == "amdgpu") {
            for opt in [
                "--device",
                "/dev/kfd",
                "--device",
                "/dev/dri",
                "--security-opt",
                "seccomp=unconfined",
            ] {
                opts.push(opt.to_string());
            }
        }
        if drivers.iter().any(|d| d == "nvidia") {
            opts.push("--gpus".to_string());
            opts.push("all".to_string());
        }
        opts
    }

    fn port_options(&self) -> Vec<String> {
        match self.ports {
            Some((external, internal)) => {
                vec!["-p".to_string(), format!("{external}:{internal}")]
            }
            None => Vec::new(),
        }
    }

    fn env_options(&self, effective: &EffectiveDefinition) -> Vec<String> {
        let mut opts = Vec::new();
        for (key, value) in &effective.environment {
            opts.push("-e".to_string());
            opts.push(format!("{key}={}", value.render()));
        }
        opts
    }

    fn volume_options(&self) -> Vec<String> {
        let mut opts = Vec::new();
        for volume in &self.volumes {
            opts.push("-v".to_string());
            opts.push(volume.clone());
        }
        opts
    }

    /// Fixed concatenation:
    /// `run` + standard + gpu + port + env + volume opts + image ref.
    async fn start_command(
        &self,
        name: &str,
        effective: &EffectiveDefinition,
    ) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        args.extend(self.standard_options(name));
        args.extend(self.gpu_options(effective).await);
        args.extend(self.port_options());
        args.extend(self.env_options(effective));
        args.extend(self.volume_options());
        args.push(format!("{IMAGE_PREFIX}{}", effective.image));
        args
    }

    async fn snapshot_runner_logs(&self, name: &str) {
        let Some(logs) = &self.runner_logs else { return };
        let args = vec!["logs".to_string(), name.to_string()];
        match self.runtime.run(&args).await {
            Ok(output) if !output.is_empty() => {
                let lines: Vec<String> = output.lines().map(String::from).collect();
                logs.add_lines(name, &lines).await;
            }
            Ok(_) => {}
            Err(e) => warn!(container = name, error = %e, "failed to capture runner logs"),
        }
    }
}

#[async_trait]
impl ProvisionableService for ContainerService {
    fn service_type(&self) -> &'static str {
        "container"
    }

    async fn start(
        &self,
        instance: &mut ServiceInformation,
        effective: &EffectiveDefinition,
    ) -> Result<(), DriverError> {
        if effective.image.is_empty() {
            return Err(DriverError::NoImage(instance.service.clone()));
        }

        let name = container_name(&instance.realm, &instance.name);
        let args = self.start_command(&name, effective).await;
        info!(instance = %instance.name, container = %name, "starting container");

        let container_id = self.runtime.run(&args).await?;

        // Status and container_id are written only once the runtime
        // confirms the container is running.
        let mut waited = Duration::ZERO;
        loop {
            if is_running(self.runtime.as_ref(), &container_id).await {
                instance.set_info(info_keys::CONTAINER_ID, &container_id);
                instance.status = ServiceStatus::Available;
                info!(instance = %instance.name, container = %name, "container running");
                self.snapshot_runner_logs(&name).await;
                return Ok(());
            }
            if waited >= self.poll_deadline {
                return Err(DriverError::StartTimeout {
                    instance: instance.name.clone(),
                    deadline_secs: self.poll_deadline.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            waited += self.poll_interval;
        }
    }

    async fn stop(&self, instance: &mut ServiceInformation) -> Result<(), DriverError> {
        let Some(container_id) = instance.info_value(info_keys::CONTAINER_ID).map(String::from)
        else {
            warn!(instance = %instance.name, "no container recorded, nothing to stop");
            return Ok(());
        };

        info!(instance = %instance.name, container_id = %container_id, "stopping container");
        let stop_args = vec!["stop".to_string(), container_id.clone()];
        if let Err(e) = self.runtime.run(&stop_args).await {
            warn!(instance = %instance.name, error = %e, "container stop returned an error");
        }

        let mut waited = Duration::ZERO;
        loop {
            if !is_running(self.runtime.as_ref(), &container_id).await {
                let rm_args = vec!["rm".to_string(), container_id.clone()];
                if let Err(e) = self.runtime.run(&rm_args).await {
                    warn!(instance = %instance.name, error = %e, "failed to remove container");
                }
                return Ok(());
            }
            if waited >= self.poll_deadline {
                return Err(DriverError::StopTimeout {
                    instance: instance.name.clone(),
                    deadline_secs: self.poll_deadline.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            waited += self.poll_interval;
        }
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
