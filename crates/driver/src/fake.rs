// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted runtime and host fakes for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use oz_core::HostSnapshot;

use crate::host::HostInspector;
use crate::runtime::{ContainerRuntime, DriverError};

#[derive(Default)]
struct FakeRuntimeInner {
    calls: Vec<Vec<String>>,
    /// container id → reported running state
    running: HashMap<String, bool>,
    next_id: u64,
    fail_run: bool,
    spawn_stopped: bool,
    ignore_stop: bool,
    logs: HashMap<String, String>,
}

/// Container runtime double: records every invocation and simulates
/// `run`/`inspect`/`stop`/`rm`/`logs` against an in-memory container table.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<FakeRuntimeInner>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded invocation, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }

    /// Make `run` invocations fail with a non-zero exit.
    pub fn fail_runs(&self) {
        self.inner.lock().fail_run = true;
    }

    /// Containers spawn but never reach the running state.
    pub fn spawn_stopped(&self) {
        self.inner.lock().spawn_stopped = true;
    }

    /// Containers acknowledge `stop` but keep running.
    pub fn ignore_stops(&self) {
        self.inner.lock().ignore_stop = true;
    }

    /// Whether the given container id is currently reported running.
    pub fn is_container_running(&self, id: &str) -> bool {
        self.inner.lock().running.get(id).copied().unwrap_or(false)
    }

    pub fn containers(&self) -> Vec<String> {
        self.inner.lock().running.keys().cloned().collect()
    }

    /// Script `logs <container>` output.
    pub fn set_logs(&self, container: &str, output: &str) {
        self.inner.lock().logs.insert(container.to_string(), output.to_string());
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn run(&self, args: &[String]) -> Result<String, DriverError> {
        let mut inner = self.inner.lock();
        inner.calls.push(args.to_vec());

        match args.first().map(String::as_str) {
            Some("run") => {
                if inner.fail_run {
                    return Err(DriverError::Invocation("docker run failed: scripted".into()));
                }
                inner.next_id += 1;
                let id = format!("ctr-{}", inner.next_id);
                let running = !inner.spawn_stopped;
                inner.running.insert(id.clone(), running);
                Ok(id)
            }
            Some("inspect") => {
                let id = args.last().map(String::as_str).unwrap_or_default();
                match inner.running.get(id) {
                    Some(running) => Ok(running.to_string()),
                    None => Err(DriverError::Invocation(format!("no such container: {id}"))),
                }
            }
            Some("stop") => {
                let id = args.last().map(String::as_str).unwrap_or_default().to_string();
                let ignore = inner.ignore_stop;
                match inner.running.get_mut(&id) {
                    Some(state) => {
                        if !ignore {
                            *state = false;
                        }
                        Ok(String::new())
                    }
                    None => Err(DriverError::Invocation(format!("no such container: {id}"))),
                }
            }
            Some("rm") => {
                let id = args.last().map(String::as_str).unwrap_or_default().to_string();
                inner.running.remove(&id);
                Ok(String::new())
            }
            Some("logs") => {
                let name = args.last().map(String::as_str).unwrap_or_default();
                Ok(inner.logs.get(name).cloned().unwrap_or_default())
            }
            other => Err(DriverError::Invocation(format!(
                "unscripted runtime command: {other:?}"
            ))),
        }
    }
}

#[derive(Default)]
struct FakeHostInner {
    snapshots: VecDeque<HostSnapshot>,
    last: HostSnapshot,
    drivers: Vec<String>,
}

/// Host inspector double with a queue of scripted snapshots.
#[derive(Clone, Default)]
pub struct FakeHost {
    inner: Arc<Mutex<FakeHostInner>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drivers(drivers: &[&str]) -> Self {
        let host = Self::default();
        host.inner.lock().drivers = drivers.iter().map(|d| d.to_string()).collect();
        host
    }

    /// Queue the next snapshot; once the queue drains the last one repeats.
    pub fn push_snapshot(&self, snapshot: HostSnapshot) {
        let mut inner = self.inner.lock();
        inner.snapshots.push_back(snapshot);
        inner.last = snapshot;
    }
}

#[async_trait]
impl HostInspector for FakeHost {
    async fn snapshot(&self) -> HostSnapshot {
        let mut inner = self.inner.lock();
        inner.snapshots.pop_front().unwrap_or(inner.last)
    }

    async fn gpu_drivers(&self) -> Vec<String> {
        self.inner.lock().drivers.clone()
    }
}
