// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Footprint requests and persisted usage records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One service variant to measure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FootprintTarget {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
}

impl FootprintTarget {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into(), profile: None, variety: None }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_variety(mut self, variety: impl Into<String>) -> Self {
        self.variety = Some(variety.into());
        self
    }
}

/// A queued footprint job.
///
/// Created by the control plane, mutated only by the footprinter (the
/// in-progress markers), removed by the footprinter on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintRequest {
    pub request_id: String,
    #[serde(default)]
    pub footprint_all_services: bool,
    #[serde(default)]
    pub services: Vec<FootprintTarget>,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub footprint_in_progress: bool,
}

/// Measured resource cost of one service variant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceUsage {
    pub cpu_cores: f64,
    pub memory_gb: f64,
    pub vram_gb: f64,
}

/// Usage record persisted to the footprint data file, keyed by
/// `(service_name, profile, variety)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub service_name: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub variety: Option<String>,
    pub usage: ServiceUsage,
}

impl UsageRecord {
    /// Sort/upsert key for the usage file.
    pub fn key(&self) -> (&str, Option<&str>, Option<&str>) {
        (
            self.service_name.as_str(),
            self.profile.as_deref(),
            self.variety.as_deref(),
        )
    }
}

#[cfg(test)]
#[path = "footprint_tests.rs"]
mod tests;
