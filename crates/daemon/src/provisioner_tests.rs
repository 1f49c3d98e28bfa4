// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;
use std::time::Duration;

use oz_cache::CacheError;
use oz_core::{info_keys, ServiceStatus};

use super::*;
use crate::test_helpers::test_bed;

fn desired(name: &str, service: &str) -> DesiredInstance {
    DesiredInstance {
        name: name.to_string(),
        service: service.to_string(),
        realm: "default".to_string(),
        profile: None,
        variety: None,
    }
}

fn desired_multi(name: &str, profile: &str, variety: &str) -> DesiredInstance {
    DesiredInstance {
        profile: Some(profile.to_string()),
        variety: Some(variety.to_string()),
        ..desired(name, "multi")
    }
}

#[tokio::test]
async fn update_initializes_new_instances_as_starting() {
    let bed = test_bed();
    bed.provisioner
        .update_services(vec![desired("a", "svc1"), desired_multi("b", "p1", "v1")])
        .await
        .unwrap();

    let active = bed.provisioner.active_services().get().await.unwrap();
    assert_eq!(active.len(), 2);
    for instance in &active {
        assert_eq!(instance.status, ServiceStatus::Starting);
        assert!(instance.info.is_empty());
        assert_eq!(instance.realm, "default");
    }

    // Names stay unique in the desired-state document
    let names: HashSet<&str> = active.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names.len(), active.len());
}

#[tokio::test]
async fn update_rejects_unknown_service() {
    let bed = test_bed();
    let err = bed.provisioner.update_services(vec![desired("a", "nope")]).await.unwrap_err();
    assert!(matches!(err, UpdateError::Invalid(ResolveError::UnknownService(_))));

    // Nothing was persisted
    assert!(bed.provisioner.active_services().get().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_rejects_missing_required_selection() {
    let bed = test_bed();
    let err = bed.provisioner.update_services(vec![desired("a", "multi")]).await.unwrap_err();
    assert!(matches!(err, UpdateError::Invalid(ResolveError::SelectionRequired { .. })));
}

#[tokio::test]
async fn absent_instances_are_marked_stopping() {
    let bed = test_bed();
    bed.provisioner.update_services(vec![desired("a", "svc1")]).await.unwrap();

    // Simulate the reconciler having made it available
    let mut active = bed.provisioner.active_services().get().await.unwrap();
    active[0].status = ServiceStatus::Available;
    bed.provisioner.active_services().set(&active).await.unwrap();

    bed.provisioner.update_services(vec![]).await.unwrap();

    let active = bed.provisioner.active_services().get().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].status, ServiceStatus::Stopping);
}

#[tokio::test]
async fn readding_a_stopping_instance_repromotes_it() {
    let bed = test_bed();
    bed.provisioner.update_services(vec![desired("a", "svc1")]).await.unwrap();
    bed.provisioner.update_services(vec![]).await.unwrap();
    assert_eq!(
        bed.provisioner.active_services().get().await.unwrap()[0].status,
        ServiceStatus::Stopping
    );

    bed.provisioner.update_services(vec![desired("a", "svc1")]).await.unwrap();

    let active = bed.provisioner.active_services().get().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].status, ServiceStatus::Starting);
}

#[tokio::test]
async fn readding_an_available_instance_is_a_noop() {
    let bed = test_bed();
    bed.provisioner.update_services(vec![desired("a", "svc1")]).await.unwrap();

    let mut active = bed.provisioner.active_services().get().await.unwrap();
    active[0].status = ServiceStatus::Available;
    active[0].set_info(info_keys::CONTAINER_ID, "ctr-9");
    bed.provisioner.active_services().set(&active).await.unwrap();

    bed.provisioner.update_services(vec![desired("a", "svc1")]).await.unwrap();

    let active = bed.provisioner.active_services().get().await.unwrap();
    assert_eq!(active[0].status, ServiceStatus::Available);
    assert_eq!(active[0].info_value(info_keys::CONTAINER_ID), Some("ctr-9"));
}

#[tokio::test]
async fn duplicate_names_in_one_payload_collapse_to_one_instance() {
    let bed = test_bed();
    bed.provisioner
        .update_services(vec![desired("a", "svc1"), desired("a", "svc1")])
        .await
        .unwrap();
    assert_eq!(bed.provisioner.active_services().get().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn persist_collision_surfaces_after_the_retry_budget() {
    let bed = test_bed();
    bed.store.hold_lock("active_services:lock", Duration::from_secs(600));

    let err = bed.provisioner.update_services(vec![desired("a", "svc1")]).await.unwrap_err();
    match err {
        UpdateError::Persist(CacheError::WriteCollision(_)) => {}
        other => panic!("expected persist collision, got {other:?}"),
    }
}
