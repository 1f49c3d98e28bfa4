// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared provisioner context and per-instance transitions.
//!
//! Constructed once in `main` and shared by the reconciler and the
//! control plane. Replaces no state in place: every mutation of the
//! desired-state list flows through the lock-guarded cache.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use oz_cache::{
    set_with_retry, ActiveServicesCache, CacheError, FootprintQueue, KvStore, RunnerLogsCache,
};
use oz_catalog::{Catalog, ResolveError};
use oz_core::{info_keys, Clock, ServiceInformation, ServiceStatus};
use oz_driver::{HostInspector, ProvisionableService, ServiceRegistry};

use crate::usage::UsageFile;

/// A desired instance as submitted to the update endpoint.
///
/// Status and info are never client-supplied; acceptance initializes new
/// instances to STARTING with empty info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredInstance {
    pub name: String,
    pub service: String,
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub variety: Option<String>,
}

fn default_realm() -> String {
    oz_core::DEFAULT_REALM.to_string()
}

/// Errors from accepting an update request.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Unknown service/profile/variety or missing required selection.
    #[error(transparent)]
    Invalid(#[from] ResolveError),

    /// The update could not be persisted within the retry budget.
    #[error("failed to persist service update: {0}")]
    Persist(#[source] CacheError),
}

/// Process-wide provisioner state. One per daemon.
pub struct Provisioner<C: Clock> {
    catalog: Arc<Catalog>,
    registry: Arc<ServiceRegistry>,
    active: ActiveServicesCache,
    footprints: FootprintQueue,
    runner_logs: RunnerLogsCache,
    host: Arc<dyn HostInspector>,
    clock: C,
    usage_file: UsageFile,
    start_window: Duration,
    stop_window: Duration,
}

impl<C: Clock> Provisioner<C> {
    pub fn new(
        catalog: Arc<Catalog>,
        registry: Arc<ServiceRegistry>,
        store: Arc<dyn KvStore>,
        host: Arc<dyn HostInspector>,
        clock: C,
        usage_file: UsageFile,
    ) -> Self {
        Self {
            catalog,
            registry,
            active: ActiveServicesCache::new(store.clone()),
            footprints: FootprintQueue::new(store.clone()),
            runner_logs: RunnerLogsCache::new(store),
            host,
            clock,
            usage_file,
            start_window: crate::env::service_start_timeout(),
            stop_window: crate::env::service_stop_timeout(),
        }
    }

    /// Override the idempotency windows (tests and configuration).
    pub fn with_windows(mut self, start: Duration, stop: Duration) -> Self {
        self.start_window = start;
        self.stop_window = stop;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_services(&self) -> &ActiveServicesCache {
        &self.active
    }

    pub fn footprint_queue(&self) -> &FootprintQueue {
        &self.footprints
    }

    pub fn runner_logs(&self) -> &RunnerLogsCache {
        &self.runner_logs
    }

    pub fn host(&self) -> &dyn HostInspector {
        self.host.as_ref()
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn usage_file(&self) -> &UsageFile {
        &self.usage_file
    }

    /// Accept a desired-state update.
    ///
    /// Present instances missing from the payload are marked STOPPING;
    /// new instances start as STARTING; a re-added STOPPING instance is
    /// re-promoted to STARTING. The reconciler drives everything else.
    pub async fn update_services(&self, updates: Vec<DesiredInstance>) -> Result<(), UpdateError> {
        for update in &updates {
            self.catalog.effective_definition(
                &update.service,
                update.profile.as_deref(),
                update.variety.as_deref(),
            )?;
        }

        let mut active = self.active.get().await.map_err(UpdateError::Persist)?;

        let requested: HashSet<&str> = updates.iter().map(|u| u.name.as_str()).collect();
        for instance in &mut active {
            if !requested.contains(instance.name.as_str()) {
                info!(instance = %instance.name, "marking instance for stop");
                instance.status = ServiceStatus::Stopping;
            }
        }

        for update in updates {
            match active.iter_mut().find(|s| s.name == update.name) {
                Some(existing) => {
                    if existing.status == ServiceStatus::Stopping {
                        info!(instance = %existing.name, "re-promoting stopping instance");
                        existing.status = ServiceStatus::Starting;
                    }
                }
                None => {
                    let mut instance =
                        ServiceInformation::starting(update.name, update.service);
                    instance.realm = update.realm;
                    instance.profile = update.profile;
                    instance.variety = update.variety;
                    active.push(instance);
                }
            }
        }

        set_with_retry(|| self.active.set(&active)).await.map_err(UpdateError::Persist)
    }

    /// Look up the implementation for an instance's service type.
    pub(crate) fn implementation_for(
        &self,
        instance: &ServiceInformation,
    ) -> Option<Arc<dyn ProvisionableService>> {
        let Some(definition) = self.catalog.get_service(&instance.service) else {
            error!(
                service = %instance.service,
                instance = %instance.name,
                "service definition not found for active instance"
            );
            return None;
        };
        match self.registry.get(&definition.service_type) {
            Ok(implementation) => Some(implementation),
            Err(e) => {
                error!(instance = %instance.name, error = %e, "no service implementation");
                None
            }
        }
    }

    /// Whether `key` holds a timestamp within `window` of now.
    fn within_window(&self, instance: &ServiceInformation, key: &str, window: Duration) -> bool {
        let Some(raw) = instance.info_value(key) else { return false };
        match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(when) => {
                let elapsed = self.clock.now() - when.with_timezone(&Utc);
                elapsed < chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX)
            }
            Err(_) => {
                warn!(instance = %instance.name, key, value = raw, "unparseable timestamp");
                false
            }
        }
    }

    /// Drive one STARTING instance through the driver.
    ///
    /// Returns true when the instance record changed and needs persisting.
    pub(crate) async fn start_instance(
        &self,
        instance: &mut ServiceInformation,
        implementation: Arc<dyn ProvisionableService>,
    ) -> bool {
        // Defense against a concurrent writer: act on the freshest markers.
        if let Ok(current) = self.active.get().await {
            if let Some(latest) = current.iter().find(|s| s.name == instance.name) {
                if latest.status == ServiceStatus::Available {
                    info!(instance = %instance.name, "already available, skipping start");
                    return false;
                }
                instance.merge_info_from(latest);
            }
        }

        if self.within_window(instance, info_keys::START_INITIATED, self.start_window) {
            info!(
                instance = %instance.name,
                "duplicate start request ignored, start already initiated"
            );
            return false;
        }

        let effective = match self.catalog.effective_definition(
            &instance.service,
            instance.profile.as_deref(),
            instance.variety.as_deref(),
        ) {
            Ok(effective) => effective,
            Err(e) => {
                error!(instance = %instance.name, error = %e, "cannot resolve definition");
                return false;
            }
        };

        instance.set_info(info_keys::START_INITIATED, self.clock.now_iso());

        info!(instance = %instance.name, service = %instance.service, "starting service");
        match implementation.start(instance, &effective).await {
            Ok(()) => {
                instance.set_info(info_keys::START_COMPLETED, self.clock.now_iso());
            }
            Err(e) => {
                // Leave the instance in its current status; the stamped
                // start_initiated suppresses retries until the window lapses.
                error!(instance = %instance.name, error = %e, "error starting service");
            }
        }
        true
    }

    /// Drive one STOPPING instance through the driver.
    pub(crate) async fn stop_instance(
        &self,
        instance: &mut ServiceInformation,
        implementation: Arc<dyn ProvisionableService>,
    ) -> bool {
        if let Ok(current) = self.active.get().await {
            match current.iter().find(|s| s.name == instance.name) {
                Some(latest) => instance.merge_info_from(latest),
                None => {
                    info!(instance = %instance.name, "already removed, skipping stop");
                    return false;
                }
            }
        }

        if self.within_window(instance, info_keys::STOP_INITIATED, self.stop_window) {
            info!(
                instance = %instance.name,
                "duplicate stop request ignored, stop already initiated"
            );
            return false;
        }

        instance.set_info(info_keys::STOP_INITIATED, self.clock.now_iso());

        info!(instance = %instance.name, service = %instance.service, "stopping service");
        match implementation.stop(instance).await {
            Ok(()) => {
                instance.set_info(info_keys::STOP_COMPLETED, self.clock.now_iso());
            }
            Err(e) => {
                error!(instance = %instance.name, error = %e, "error stopping service");
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod tests;
