// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::MemoryStore;

#[tokio::test]
async fn lines_round_trip_per_container() {
    let store = MemoryStore::new();
    let cache = RunnerLogsCache::new(Arc::new(store.clone()));

    cache.add_lines("ozsvc--default--a", &["one".to_string(), "two".to_string()]).await;
    cache.add_lines("ozsvc--default--b", &["other".to_string()]).await;
    cache.add_lines("ozsvc--default--a", &["three".to_string()]).await;

    assert_eq!(cache.lines("ozsvc--default--a").await, ["one", "two", "three"]);
    assert_eq!(cache.lines("ozsvc--default--b").await, ["other"]);
    assert!(cache.lines("ozsvc--default--missing").await.is_empty());
}

#[tokio::test]
async fn writes_refresh_the_48_hour_ttl() {
    let store = MemoryStore::new();
    let cache = RunnerLogsCache::new(Arc::new(store.clone()));

    cache.add_lines("ozsvc--default--a", &["line".to_string()]).await;
    assert_eq!(
        store.ttl_of("runner_logs:ozsvc--default--a"),
        Some(Duration::from_secs(48 * 3600))
    );
}

#[tokio::test]
async fn empty_line_batches_are_ignored() {
    let store = MemoryStore::new();
    let cache = RunnerLogsCache::new(Arc::new(store.clone()));
    cache.add_lines("ozsvc--default--a", &[]).await;
    assert!(store.ttl_of("runner_logs:ozsvc--default--a").is_none());
}
