// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;

use oz_catalog::Catalog;
use oz_core::{HostSnapshot, ServiceInformation};

use super::*;
use crate::test_helpers::{test_bed, CATALOG_YAML};
use crate::usage::UsageFile;

fn request(id: &str, targets: Vec<FootprintTarget>, all: bool) -> FootprintRequest {
    FootprintRequest {
        request_id: id.to_string(),
        footprint_all_services: all,
        services: targets,
        requested_at: Utc::now(),
        footprint_started_at: None,
        footprint_in_progress: false,
    }
}

#[test]
fn targets_are_the_cartesian_product_of_profiles_and_varieties() {
    let catalog: Catalog = serde_yaml::from_str(CATALOG_YAML).unwrap();
    let multi = catalog.get_service("multi").unwrap();

    let targets = enumerate_targets(multi);
    let keys: Vec<(Option<&str>, Option<&str>)> =
        targets.iter().map(|t| (t.profile.as_deref(), t.variety.as_deref())).collect();
    assert_eq!(
        keys,
        vec![
            (Some("p1"), Some("v1")),
            (Some("p1"), Some("v2")),
            (Some("p2"), Some("v1")),
            (Some("p2"), Some("v2")),
        ]
    );
}

#[yare::parameterized(
    plain = { "svc1", vec![(None, None)] },
)]
fn targets_collapse_absent_dimensions(service: &str, expected: Vec<(Option<&str>, Option<&str>)>) {
    let catalog: Catalog = serde_yaml::from_str(CATALOG_YAML).unwrap();
    let definition = catalog.get_service(service).unwrap();
    let targets = enumerate_targets(definition);
    let keys: Vec<(Option<&str>, Option<&str>)> =
        targets.iter().map(|t| (t.profile.as_deref(), t.variety.as_deref())).collect();
    assert_eq!(keys, expected);
}

#[test]
fn profile_only_and_variety_only_services_enumerate_one_dimension() {
    let catalog: Catalog = serde_yaml::from_str(
        r#"
services:
  - name: profiled
    type: container
    profiles:
      a: {}
      b: {}
  - name: varied
    type: container
    varieties:
      x: {}
"#,
    )
    .unwrap();

    let profiled = enumerate_targets(catalog.get_service("profiled").unwrap());
    assert_eq!(profiled.len(), 2);
    assert!(profiled.iter().all(|t| t.variety.is_none()));

    let varied = enumerate_targets(catalog.get_service("varied").unwrap());
    assert_eq!(varied.len(), 1);
    assert_eq!(varied[0].variety.as_deref(), Some("x"));
    assert!(varied[0].profile.is_none());
}

#[tokio::test]
async fn footprint_records_the_resource_delta() {
    let bed = test_bed();
    // Pre: 8 cores / 32 GB free. Post: 6.5 cores / 30 GB free.
    bed.host.push_snapshot(HostSnapshot {
        total_cpu_cores: 8.0,
        available_cpu_cores: 8.0,
        total_ram_gb: 32.0,
        available_ram_gb: 32.0,
        ..Default::default()
    });
    bed.host.push_snapshot(HostSnapshot {
        total_cpu_cores: 8.0,
        available_cpu_cores: 6.5,
        total_ram_gb: 32.0,
        available_ram_gb: 30.0,
        ..Default::default()
    });

    let target = FootprintTarget::new("multi").with_profile("p1").with_variety("v1");
    let req = request("r1", vec![target], false);
    bed.provisioner.footprint_queue().append(&req).await.unwrap();

    bed.provisioner.handle_footprint_request(req).await;

    let records = UsageFile::new(&bed.usage_path).load().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].service_name, "multi");
    assert_eq!(records[0].profile.as_deref(), Some("p1"));
    assert_eq!(records[0].usage.cpu_cores, 1.5);
    assert_eq!(records[0].usage.memory_gb, 2.0);

    // Job removed, host unloaded, container cleaned up
    assert!(bed.provisioner.footprint_queue().get_all().await.unwrap().is_empty());
    assert!(bed.provisioner.active_services().get().await.unwrap().is_empty());
    assert!(bed.runtime.containers().is_empty());
}

#[tokio::test]
async fn footprint_all_services_covers_the_whole_catalog() {
    let bed = test_bed();
    let req = request("r1", vec![], true);
    bed.provisioner.footprint_queue().append(&req).await.unwrap();

    bed.provisioner.handle_footprint_request(req).await;

    // svc1 once, multi 2×2; ghost has no implementation and records nothing
    let records = UsageFile::new(&bed.usage_path).load().unwrap();
    assert_eq!(records.len(), 5);

    // Written back sorted by (service_name, profile, variety)
    let keys: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "{}|{}|{}",
                r.service_name,
                r.profile.as_deref().unwrap_or(""),
                r.variety.as_deref().unwrap_or("")
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn loaded_system_abandons_the_job_but_keeps_the_request() {
    let bed = test_bed();
    let req = request("r1", vec![FootprintTarget::new("svc1")], false);
    bed.provisioner.footprint_queue().append(&req).await.unwrap();

    // Someone started a service between admission and processing
    bed.provisioner
        .active_services()
        .set(&[ServiceInformation::starting("a", "svc1")])
        .await
        .unwrap();

    bed.provisioner.handle_footprint_request(req).await;

    // No measurement happened; the request stays queued for a later
    // unloaded cycle, marked in progress.
    assert!(!bed.usage_path.exists());
    assert_eq!(bed.runtime.call_count(), 0);
    let queued = bed.provisioner.footprint_queue().get_all().await.unwrap();
    assert_eq!(queued.len(), 1);
    assert!(queued[0].footprint_in_progress);
    assert!(queued[0].footprint_started_at.is_some());
}

#[tokio::test]
async fn unknown_request_id_cannot_be_marked_and_is_dropped() {
    let bed = test_bed();
    // Request never queued: marking it in-progress fails with NotFound
    let req = request("ghost", vec![FootprintTarget::new("svc1")], false);
    bed.provisioner.handle_footprint_request(req).await;
    assert_eq!(bed.runtime.call_count(), 0);
    assert!(!bed.usage_path.exists());
}
