// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service registry: type tag → provisionable-service implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use oz_catalog::EffectiveDefinition;
use oz_core::ServiceInformation;

use crate::runtime::DriverError;

/// A service implementation the provisioner can drive.
///
/// `start` must not transition status or write `container_id` until the
/// runtime confirms the container running; on timeout it leaves the
/// instance in STARTING and returns an error. `stop` leaves the instance
/// STOPPING; completion is recorded by the caller.
#[async_trait]
pub trait ProvisionableService: Send + Sync {
    /// Unique tag matched against `ServiceDefinition.type`.
    fn service_type(&self) -> &'static str;

    async fn start(
        &self,
        instance: &mut ServiceInformation,
        effective: &EffectiveDefinition,
    ) -> Result<(), DriverError>;

    async fn stop(&self, instance: &mut ServiceInformation) -> Result<(), DriverError>;
}

impl std::fmt::Debug for dyn ProvisionableService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionableService")
            .field("service_type", &self.service_type())
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no provisionable service implementation for type '{0}'")]
    NoImplementation(String),
}

/// Static registration table built once at startup, read-only after.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<dyn ProvisionableService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation; duplicate tags keep the first and warn.
    pub fn register(&mut self, service: Arc<dyn ProvisionableService>) -> bool {
        let tag = service.service_type().to_string();
        if self.services.contains_key(&tag) {
            warn!(service_type = %tag, "duplicate service_type registration ignored");
            return false;
        }
        self.services.insert(tag, service);
        true
    }

    pub fn get(&self, service_type: &str) -> Result<Arc<dyn ProvisionableService>, RegistryError> {
        self.services
            .get(service_type)
            .cloned()
            .ok_or_else(|| RegistryError::NoImplementation(service_type.to_string()))
    }

    pub fn service_types(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.services.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
