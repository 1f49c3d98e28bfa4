// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oz-driver: container runtime invocation and the service registry.
//!
//! Translates an instance plus its effective definition into container
//! runtime start/stop calls, observing container state through bounded
//! poll loops. The runtime itself sits behind [`ContainerRuntime`] so
//! tests script it.

mod container;
#[cfg(any(test, feature = "test-support"))]
mod fake;
mod host;
mod registry;
mod runtime;

pub use container::ContainerService;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHost, FakeRuntime};
pub use host::{HostInspector, ProcHost};
pub use registry::{ProvisionableService, RegistryError, ServiceRegistry};
pub use runtime::{is_running, ContainerRuntime, DockerCli, DriverError};
