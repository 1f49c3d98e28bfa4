// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service instances and their status state machine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::DEFAULT_REALM;

/// Well-known keys in [`ServiceInformation::info`].
///
/// The reconciler writes the four timestamps (ISO-8601) and the driver
/// writes `container_id` once the runtime confirms the container running.
pub mod info_keys {
    pub const START_INITIATED: &str = "start_initiated";
    pub const START_COMPLETED: &str = "start_completed";
    pub const STOP_INITIATED: &str = "stop_initiated";
    pub const STOP_COMPLETED: &str = "stop_completed";
    pub const CONTAINER_ID: &str = "container_id";
}

/// Lifecycle status of an instance.
///
/// Transitions are monotone: STARTING → AVAILABLE → STOPPING → removed.
/// An instance never re-enters an earlier status; re-adding a STOPPING
/// instance resets it to STARTING at request-acceptance time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Starting,
    Available,
    Stopping,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Starting => "starting",
            ServiceStatus::Available => "available",
            ServiceStatus::Stopping => "stopping",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for status strings outside the state machine.
#[derive(Debug, Error)]
#[error("unknown service status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for ServiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starting" => Ok(ServiceStatus::Starting),
            "available" => Ok(ServiceStatus::Available),
            "stopping" => Ok(ServiceStatus::Stopping),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::unknown_variant(&s, &["starting", "available", "stopping"])
        })
    }
}

/// Open string-keyed metadata carried by an instance.
pub type ServiceInfo = BTreeMap<String, String>;

/// A named, reified selection of (service, profile?, variety?) with a status.
///
/// The list of these, serialized as one JSON document under the
/// `active_services` key, is the desired state of the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInformation {
    pub name: String,
    /// Name of the catalog service definition this instance reifies.
    pub service: String,
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
    pub status: ServiceStatus,
    #[serde(default)]
    pub info: ServiceInfo,
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

impl ServiceInformation {
    /// New instance in STARTING with empty info, default realm.
    pub fn starting(name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            realm: default_realm(),
            profile: None,
            variety: None,
            status: ServiceStatus::Starting,
            info: ServiceInfo::new(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_variety(mut self, variety: impl Into<String>) -> Self {
        self.variety = Some(variety.into());
        self
    }

    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    pub fn set_info(&mut self, key: &str, value: impl Into<String>) {
        self.info.insert(key.to_string(), value.into());
    }

    /// Merge info entries from a fresher snapshot of the same instance.
    ///
    /// Used by the reconciler before acting so that markers written by a
    /// concurrent provisioner (e.g. `start_initiated`) are observed.
    pub fn merge_info_from(&mut self, fresher: &ServiceInformation) {
        for (k, v) in &fresher.info {
            self.info.insert(k.clone(), v.clone());
        }
    }

    /// A STOPPING instance whose stop has completed; elided on the next persist.
    pub fn is_stopped(&self) -> bool {
        self.status == ServiceStatus::Stopping
            && self.info.contains_key(info_keys::STOP_COMPLETED)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
