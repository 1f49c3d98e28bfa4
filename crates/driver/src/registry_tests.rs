// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;

struct StubService(&'static str);

#[async_trait]
impl ProvisionableService for StubService {
    fn service_type(&self) -> &'static str {
        self.0
    }

    async fn start(
        &self,
        _instance: &mut ServiceInformation,
        _effective: &EffectiveDefinition,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    async fn stop(&self, _instance: &mut ServiceInformation) -> Result<(), DriverError> {
        Ok(())
    }
}

#[test]
fn lookup_returns_the_registered_implementation() {
    let mut registry = ServiceRegistry::new();
    assert!(registry.register(Arc::new(StubService("container"))));

    let svc = registry.get("container").unwrap();
    assert_eq!(svc.service_type(), "container");
}

#[test]
fn duplicate_tags_keep_the_first_registration() {
    let mut registry = ServiceRegistry::new();
    assert!(registry.register(Arc::new(StubService("container"))));
    assert!(!registry.register(Arc::new(StubService("container"))));
    assert_eq!(registry.len(), 1);
}

#[test]
fn unknown_tag_is_no_implementation() {
    let registry = ServiceRegistry::new();
    assert_eq!(
        registry.get("vm").unwrap_err(),
        RegistryError::NoImplementation("vm".to_string())
    );
}

#[test]
fn service_types_are_sorted() {
    let mut registry = ServiceRegistry::new();
    registry.register(Arc::new(StubService("vm")));
    registry.register(Arc::new(StubService("container")));
    assert_eq!(registry.service_types(), ["container", "vm"]);
}
