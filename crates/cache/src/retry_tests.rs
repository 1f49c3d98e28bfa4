// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn collision() -> CacheError {
    CacheError::WriteCollision("active_services:lock".to_string())
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_does_not_sleep() {
    let calls = AtomicUsize::new(0);
    set_with_retry(|| async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .await
    .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn collisions_retry_every_500ms_until_success() {
    let calls = AtomicUsize::new(0);
    set_with_retry(|| async {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n < 3 {
            Err(collision())
        } else {
            Ok(())
        }
    })
    .await
    .unwrap();
    // 3 collisions then success
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_the_collision() {
    let calls = AtomicUsize::new(0);
    let err = set_with_retry(|| async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(collision())
    })
    .await
    .unwrap_err();
    assert!(matches!(err, CacheError::WriteCollision(_)));
    // 5s deadline at 500ms intervals: initial attempt plus 10 retries
    assert_eq!(calls.load(Ordering::SeqCst), 11);
}

#[tokio::test(start_paused = true)]
async fn lock_faults_are_retried_like_collisions() {
    let calls = AtomicUsize::new(0);
    set_with_retry(|| async {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            Err(CacheError::Lock {
                key: "active_services:lock".to_string(),
                reason: "expired".to_string(),
            })
        } else {
            Ok(())
        }
    })
    .await
    .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_errors_return_immediately() {
    let calls = AtomicUsize::new(0);
    let err = set_with_retry(|| async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(CacheError::NotFound("r1".to_string()))
    })
    .await
    .unwrap_err();
    assert!(matches!(err, CacheError::NotFound(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
