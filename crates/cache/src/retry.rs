// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry for lock-contended writes.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::store::CacheError;

/// Interval between attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Total time budget before giving up.
pub const RETRY_DEADLINE: Duration = Duration::from_secs(5);

/// Retry `attempt` on [`CacheError::WriteCollision`] and transient lock
/// faults at 500 ms intervals for up to 5 seconds, then surface the last
/// error. Non-retryable errors return immediately.
pub async fn set_with_retry<F, Fut>(mut attempt: F) -> Result<(), CacheError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), CacheError>>,
{
    let deadline = tokio::time::Instant::now() + RETRY_DEADLINE;
    loop {
        match attempt().await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_retryable() => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(err);
                }
                debug!(error = %err, "write contended, retrying");
                tokio::time::sleep(RETRY_INTERVAL).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
