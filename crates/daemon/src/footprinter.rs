// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The footprinter: single-tenant measurement of service variants.
//!
//! Runs inside the reconciler task when the host is unloaded. Each target
//! is started alone, left running for its configured run time, measured,
//! stopped, and its usage delta upserted into the usage-record file.

use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use oz_cache::set_with_retry;
use oz_catalog::ServiceDefinition;
use oz_core::{
    footprinter_instance_name, info_keys, Clock, FootprintRequest, FootprintTarget,
    HostSnapshot, ServiceInformation, ServiceStatus, UsageRecord,
};

use crate::provisioner::Provisioner;

/// How long to wait for start/stop completion markers.
const MARKER_TIMEOUT: Duration = Duration::from_secs(60);
const MARKER_POLL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum FootprintError {
    #[error(transparent)]
    Resolve(#[from] oz_catalog::ResolveError),

    #[error(transparent)]
    Cache(#[from] oz_cache::CacheError),

    #[error(transparent)]
    Usage(#[from] crate::usage::UsageFileError),
}

/// Measurement targets for one service: the cartesian product of its
/// profiles and varieties, collapsing absent dimensions.
pub fn enumerate_targets(definition: &ServiceDefinition) -> Vec<FootprintTarget> {
    let base = FootprintTarget::new(&definition.name);
    match (definition.has_profiles(), definition.has_varieties()) {
        (true, true) => {
            let mut targets = Vec::new();
            for profile in definition.profiles.keys() {
                for variety in definition.varieties.keys() {
                    targets.push(
                        base.clone().with_profile(profile.clone()).with_variety(variety.clone()),
                    );
                }
            }
            targets
        }
        (true, false) => {
            definition.profiles.keys().map(|p| base.clone().with_profile(p.clone())).collect()
        }
        (false, true) => {
            definition.varieties.keys().map(|v| base.clone().with_variety(v.clone())).collect()
        }
        (false, false) => vec![base],
    }
}

impl<C: Clock> Provisioner<C> {
    /// Process one footprint request end to end.
    ///
    /// If the desired-state list turns out non-empty before a target, the
    /// remainder of the job is abandoned and the request stays queued for
    /// the next unloaded cycle; completed targets are never rolled back.
    pub(crate) async fn handle_footprint_request(&self, mut request: FootprintRequest) {
        request.footprint_in_progress = true;
        request.footprint_started_at = Some(self.clock().now());
        if let Err(e) = self.footprint_queue().update_by_id(&request).await {
            error!(request_id = %request.request_id, error = %e, "cannot mark request in progress");
            return;
        }

        let targets: Vec<FootprintTarget> = if request.footprint_all_services {
            self.catalog().services.iter().flat_map(enumerate_targets).collect()
        } else {
            request.services.clone()
        };
        info!(request_id = %request.request_id, targets = targets.len(), "footprinting");

        for target in targets {
            match self.active_services().get().await {
                Ok(active) if active.is_empty() => {}
                Ok(_) => {
                    warn!(
                        request_id = %request.request_id,
                        "system no longer unloaded, abandoning remaining targets"
                    );
                    return;
                }
                Err(e) => {
                    error!(error = %e, "cannot verify unloaded system, abandoning request");
                    return;
                }
            }

            if let Err(e) = self.footprint_single(&target).await {
                error!(
                    service = %target.service_name,
                    profile = ?target.profile,
                    variety = ?target.variety,
                    error = %e,
                    "footprinting error"
                );
            }
        }

        if let Err(e) =
            set_with_retry(|| self.footprint_queue().remove_by_id(&request.request_id)).await
        {
            error!(request_id = %request.request_id, error = %e, "failed to remove completed request");
        }
    }

    /// Measure one target: snapshot, start, run, snapshot, stop, record.
    async fn footprint_single(&self, target: &FootprintTarget) -> Result<(), FootprintError> {
        let effective = self.catalog().effective_definition(
            &target.service_name,
            target.profile.as_deref(),
            target.variety.as_deref(),
        )?;

        let instance_name = footprinter_instance_name(
            &target.service_name,
            target.profile.as_deref(),
            target.variety.as_deref(),
        );

        let mut instance = ServiceInformation::starting(&instance_name, &target.service_name);
        instance.profile = target.profile.clone();
        instance.variety = target.variety.clone();

        let Some(implementation) = self.implementation_for(&instance) else {
            return Ok(());
        };

        let pre = self.host().snapshot().await;

        // Publish the synthesized instance, then drive the start path
        // directly; the reconciler loop is occupied by this job.
        info!(instance = %instance_name, "starting footprint target");
        set_with_retry(|| self.active_services().set(std::slice::from_ref(&instance))).await?;
        self.start_instance(&mut instance, implementation.clone()).await;
        set_with_retry(|| self.active_services().set(std::slice::from_ref(&instance))).await?;
        self.wait_for_marker(&instance_name, info_keys::START_COMPLETED).await;

        tokio::time::sleep(Duration::from_secs(effective.footprint.run_time)).await;

        let post = self.host().snapshot().await;
        let usage = HostSnapshot::usage_delta(&pre, &post);
        self.usage_file().upsert(UsageRecord {
            service_name: target.service_name.clone(),
            profile: target.profile.clone(),
            variety: target.variety.clone(),
            usage,
        })?;

        info!(instance = %instance_name, "stopping footprint target");
        instance.status = ServiceStatus::Stopping;
        self.stop_instance(&mut instance, implementation).await;
        set_with_retry(|| self.active_services().set(std::slice::from_ref(&instance))).await?;
        self.wait_for_marker(&instance_name, info_keys::STOP_COMPLETED).await;

        // Restore the unloaded state for the next target.
        set_with_retry(|| self.active_services().set(&[])).await?;
        Ok(())
    }

    /// Poll the cache until the named instance carries the marker.
    ///
    /// Timing out is logged and tolerated; the measurement proceeds with
    /// whatever state the instance reached.
    async fn wait_for_marker(&self, instance_name: &str, marker: &str) {
        let mut waited = Duration::ZERO;
        while waited < MARKER_TIMEOUT {
            if let Ok(services) = self.active_services().get().await {
                let done = services
                    .iter()
                    .any(|s| s.name == instance_name && s.info.contains_key(marker));
                if done {
                    return;
                }
            }
            tokio::time::sleep(MARKER_POLL).await;
            waited += MARKER_POLL;
        }
        warn!(instance = instance_name, marker, "timeout waiting for marker, proceeding");
    }
}

#[cfg(test)]
#[path = "footprinter_tests.rs"]
mod tests;
