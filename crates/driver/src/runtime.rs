// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime seam.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from driving the container runtime.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The runtime binary failed to execute or returned non-zero.
    #[error("container runtime invocation failed: {0}")]
    Invocation(String),

    #[error("no container image resolved for service '{0}'")]
    NoImage(String),

    #[error("container for '{instance}' not running after {deadline_secs}s")]
    StartTimeout { instance: String, deadline_secs: u64 },

    #[error("container for '{instance}' still running after {deadline_secs}s")]
    StopTimeout { instance: String, deadline_secs: u64 },
}

/// A container runtime driven through its CLI.
///
/// `run` executes one subcommand (`run`, `inspect`, `stop`, `rm`, `logs`)
/// and returns trimmed stdout; a non-zero exit is [`DriverError::Invocation`].
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<String, DriverError>;
}

/// Whether the runtime reports the container as running.
///
/// Inspection failures (unknown container, runtime error) read as not
/// running, which is what both poll loops want.
pub async fn is_running(runtime: &dyn ContainerRuntime, container_id: &str) -> bool {
    let args = vec![
        "inspect".to_string(),
        "--format={{.State.Running}}".to_string(),
        container_id.to_string(),
    ];
    match runtime.run(&args).await {
        Ok(stdout) => stdout.trim() == "true",
        Err(_) => false,
    }
}

/// The docker CLI, invoked as a subprocess.
#[derive(Clone)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new() -> Self {
        Self { program: "docker".to_string() }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn run(&self, args: &[String]) -> Result<String, DriverError> {
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| DriverError::Invocation(format!("failed to exec {}: {}", self.program, e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DriverError::Invocation(format!(
                "{} {} failed: {}",
                self.program,
                args.first().map(String::as_str).unwrap_or(""),
                stderr.trim()
            )))
        }
    }
}
