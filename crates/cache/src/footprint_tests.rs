// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use oz_core::{FootprintRequest, FootprintTarget};

use super::*;
use crate::MemoryStore;

fn request(id: &str) -> FootprintRequest {
    FootprintRequest {
        request_id: id.to_string(),
        footprint_all_services: false,
        services: vec![FootprintTarget::new("svc")],
        requested_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        footprint_started_at: None,
        footprint_in_progress: false,
    }
}

fn queue_over(store: &MemoryStore) -> FootprintQueue {
    FootprintQueue::new(Arc::new(store.clone()))
}

#[tokio::test]
async fn empty_queue_reads_as_empty() {
    let queue = queue_over(&MemoryStore::new());
    assert!(queue.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn append_creates_and_extends_the_list() {
    let queue = queue_over(&MemoryStore::new());
    queue.append(&request("r1")).await.unwrap();
    queue.append(&request("r2")).await.unwrap();

    let all = queue.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].request_id, "r1");
    assert_eq!(all[1].request_id, "r2");
}

#[tokio::test]
async fn update_by_id_replaces_the_matching_entry() {
    let queue = queue_over(&MemoryStore::new());
    queue.append(&request("r1")).await.unwrap();
    queue.append(&request("r2")).await.unwrap();

    let mut updated = request("r2");
    updated.footprint_in_progress = true;
    updated.footprint_started_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 5, 0).unwrap());
    queue.update_by_id(&updated).await.unwrap();

    let all = queue.get_all().await.unwrap();
    assert!(!all[0].footprint_in_progress);
    assert!(all[1].footprint_in_progress);
    assert!(all[1].footprint_started_at.is_some());
}

#[tokio::test]
async fn update_unknown_id_is_not_found_and_releases_the_lock() {
    let store = MemoryStore::new();
    let queue = queue_over(&store);
    queue.append(&request("r1")).await.unwrap();

    let err = queue.update_by_id(&request("ghost")).await.unwrap_err();
    assert!(matches!(err, CacheError::NotFound(_)));
    assert!(!err.is_retryable());

    // Lock must not remain held after the failure
    queue.append(&request("r2")).await.unwrap();
    assert_eq!(queue.get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn remove_by_id_drops_only_the_matching_request() {
    let queue = queue_over(&MemoryStore::new());
    queue.append(&request("r1")).await.unwrap();
    queue.append(&request("r2")).await.unwrap();

    queue.remove_by_id("r1").await.unwrap();
    let all = queue.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].request_id, "r2");

    // Removing a missing id is a no-op
    queue.remove_by_id("ghost").await.unwrap();
    assert_eq!(queue.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn queue_lock_is_distinct_from_the_desired_state_lock() {
    let store = MemoryStore::new();
    store.hold_lock("active_services:lock", Duration::from_secs(60));

    // Desired-state contention does not block the footprint queue
    let queue = queue_over(&store);
    queue.append(&request("r1")).await.unwrap();

    store.hold_lock("footprint_requests:lock", Duration::from_secs(60));
    let err = queue.append(&request("r2")).await.unwrap_err();
    assert!(matches!(err, CacheError::WriteCollision(_)));
}
