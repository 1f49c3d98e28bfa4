// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host resource views exchanged with the control plane and footprinter.

use serde::{Deserialize, Serialize};

/// Point-in-time view of host capacity.
///
/// The footprinter diffs two of these around a service run; the control
/// plane reports the current one under `/srv/resources/available/`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub total_cpu_cores: f64,
    pub available_cpu_cores: f64,
    pub total_ram_gb: f64,
    pub available_ram_gb: f64,
    pub total_vram_gb: f64,
    pub available_vram_gb: f64,
}

impl HostSnapshot {
    /// Per-dimension `max(0, pre - post)` delta between two snapshots.
    pub fn usage_delta(pre: &HostSnapshot, post: &HostSnapshot) -> crate::ServiceUsage {
        crate::ServiceUsage {
            cpu_cores: (pre.available_cpu_cores - post.available_cpu_cores).max(0.0),
            memory_gb: (pre.available_ram_gb - post.available_ram_gb).max(0.0),
            vram_gb: (pre.available_vram_gb - post.available_vram_gb).max(0.0),
        }
    }
}

/// One reportable resource, as returned by the available-resources endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub unit: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_resources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_attributes: Option<serde_json::Value>,
}

impl Resource {
    /// Standard cpu/memory/vram resource rows for a host snapshot.
    pub fn from_snapshot(snapshot: &HostSnapshot) -> Vec<Resource> {
        let mut resources = vec![
            Resource {
                name: "cpu".to_string(),
                resource_type: "cpu".to_string(),
                unit: "cores".to_string(),
                value: snapshot.available_cpu_cores,
                related_resources: None,
                extended_attributes: Some(
                    serde_json::json!({ "total": snapshot.total_cpu_cores }),
                ),
            },
            Resource {
                name: "memory".to_string(),
                resource_type: "memory".to_string(),
                unit: "GB".to_string(),
                value: snapshot.available_ram_gb,
                related_resources: None,
                extended_attributes: Some(
                    serde_json::json!({ "total": snapshot.total_ram_gb }),
                ),
            },
        ];
        if snapshot.total_vram_gb > 0.0 {
            resources.push(Resource {
                name: "vram".to_string(),
                resource_type: "vram".to_string(),
                unit: "GB".to_string(),
                value: snapshot.available_vram_gb,
                related_resources: Some(vec!["gpu".to_string()]),
                extended_attributes: Some(
                    serde_json::json!({ "total": snapshot.total_vram_gb }),
                ),
            });
        }
        resources
    }
}
