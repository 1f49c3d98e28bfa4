// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reconciler loop.
//!
//! Single cooperative loop with a 2-second base period. Each iteration
//! snapshots the desired state, drives STARTING/STOPPING instances,
//! elides completed stops, and persists the outcome atomically as one
//! list. When the host is unloaded it delegates one pending footprint
//! request instead.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use oz_cache::set_with_retry;
use oz_core::{Clock, ServiceStatus};

use crate::provisioner::Provisioner;

/// Base period between iterations.
pub const PERIOD: Duration = Duration::from_secs(2);

/// Short cycle after delegating a footprint request.
pub const SHORT_CYCLE: Duration = Duration::from_millis(200);

/// Outcome of one iteration, deciding the next sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// Nothing to do, or transitions were driven.
    Regular,
    /// A footprint request was processed; loop again quickly.
    ShortCycle,
}

/// The reconciler worker.
pub struct Reconciler<C: Clock> {
    provisioner: Arc<Provisioner<C>>,
    cancel: CancellationToken,
    period: Duration,
}

impl<C: Clock + 'static> Reconciler<C> {
    pub fn new(provisioner: Arc<Provisioner<C>>, cancel: CancellationToken) -> Self {
        Self { provisioner, cancel, period: PERIOD }
    }

    #[cfg(test)]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run until cancelled. In-flight driver polls finish; no new
    /// iteration begins after the token fires.
    pub async fn run(self) {
        info!("reconciler started");
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let outcome = self.provisioner.reconcile_iteration().await;
            let sleep = match outcome {
                Iteration::ShortCycle => SHORT_CYCLE,
                Iteration::Regular => self.period,
            };

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(sleep) => {}
            }
        }
        info!("reconciler stopped");
    }
}

impl<C: Clock> Provisioner<C> {
    /// One pass of the reconciler.
    pub async fn reconcile_iteration(&self) -> Iteration {
        let active = match self.active_services().get().await {
            Ok(active) => active,
            Err(e) => {
                error!(error = %e, "failed to read desired state");
                return Iteration::Regular;
            }
        };

        // Unloaded host: the footprinter may take a pending request.
        if active.is_empty() {
            match self.footprint_queue().get_all().await {
                Ok(requests) => {
                    if let Some(request) = requests.into_iter().next() {
                        info!(request_id = %request.request_id, "delegating footprint request");
                        self.handle_footprint_request(request).await;
                        return Iteration::ShortCycle;
                    }
                }
                Err(e) => error!(error = %e, "failed to read footprint queue"),
            }
            return Iteration::Regular;
        }

        let mut services = active;
        let mut any_updated = false;

        for instance in &mut services {
            if !matches!(instance.status, ServiceStatus::Starting | ServiceStatus::Stopping) {
                continue;
            }

            let Some(implementation) = self.implementation_for(instance) else {
                continue;
            };

            let updated = match instance.status {
                ServiceStatus::Starting => {
                    self.start_instance(instance, implementation).await
                }
                ServiceStatus::Stopping => self.stop_instance(instance, implementation).await,
                ServiceStatus::Available => false,
            };
            any_updated |= updated;
        }

        if any_updated {
            // Elide terminal instances: a STOPPING entry with stop_completed
            // must not reappear.
            services.retain(|s| !s.is_stopped());

            if let Err(e) = set_with_retry(|| self.active_services().set(&services)).await {
                error!(error = %e, "failed to persist desired state");
            }
        }

        Iteration::Regular
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
