// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for daemon tests: a provisioner wired to fakes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use oz_cache::{MemoryStore, RunnerLogsCache};
use oz_catalog::Catalog;
use oz_core::test_support::fixed_clock;
use oz_core::FakeClock;
use oz_driver::{ContainerService, FakeHost, FakeRuntime, ServiceRegistry};

use crate::provisioner::Provisioner;
use crate::usage::UsageFile;

/// svc1: plain container. multi: profiles × varieties. ghost: no
/// registered implementation for its type.
pub(crate) const CATALOG_YAML: &str = r#"
services:
  - name: svc1
    type: container
    image: app.img
    footprint:
      run-time: 0
  - name: multi
    type: container
    image: multi.img
    footprint:
      run-time: 0
    profiles:
      p1: {}
      p2: {}
    varieties:
      v1: {}
      v2: {}
  - name: ghost
    type: vm
    image: ghost.img
    footprint:
      run-time: 0
provisioners:
  - name: test
    host: localhost
"#;

pub(crate) struct TestBed {
    pub provisioner: Arc<Provisioner<FakeClock>>,
    pub store: MemoryStore,
    pub runtime: FakeRuntime,
    pub host: FakeHost,
    pub clock: FakeClock,
    pub usage_path: PathBuf,
    _tmp: tempfile::TempDir,
}

pub(crate) fn test_bed() -> TestBed {
    let store = MemoryStore::new();
    let runtime = FakeRuntime::new();
    let host = FakeHost::new();
    let clock = fixed_clock();

    #[allow(clippy::unwrap_used)]
    let catalog: Catalog = serde_yaml::from_str(CATALOG_YAML).unwrap();

    let mut registry = ServiceRegistry::new();
    registry.register(Arc::new(
        ContainerService::new(Arc::new(runtime.clone()), Arc::new(host.clone()))
            .with_poll(Duration::ZERO, Duration::from_secs(1))
            .with_runner_logs(RunnerLogsCache::new(Arc::new(store.clone()))),
    ));

    #[allow(clippy::unwrap_used)]
    let tmp = tempfile::tempdir().unwrap();
    let usage_path = tmp.path().join("usage.yml");

    let provisioner = Arc::new(
        Provisioner::new(
            Arc::new(catalog),
            Arc::new(registry),
            Arc::new(store.clone()),
            Arc::new(host.clone()),
            clock.clone(),
            UsageFile::new(&usage_path),
        )
        .with_windows(Duration::from_secs(3600), Duration::from_secs(3600)),
    );

    TestBed { provisioner, store, runtime, host, clock, usage_path, _tmp: tmp }
}
