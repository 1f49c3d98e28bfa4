// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value store seam shared by the caches.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// TTL on the non-blocking write locks.
pub const LOCK_TTL: Duration = Duration::from_secs(1);

/// Errors from the cache layer.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The non-blocking lock was held by another writer.
    #[error("write collision: failed to acquire {0}")]
    WriteCollision(String),

    /// Lock subsystem fault (e.g. the lock expired before release).
    /// Transient; retried under the same policy as collisions.
    #[error("lock error on {key}: {reason}")]
    Lock { key: String, reason: String },

    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Footprint update referenced an unknown request_id. Never retried.
    #[error("no footprint request found with request_id={0}")]
    NotFound(String),
}

impl CacheError {
    /// Whether the bounded retry policy applies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CacheError::WriteCollision(_) | CacheError::Lock { .. })
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

/// Minimal key-value operations the caches need.
///
/// Implemented by [`crate::RedisStore`] for production and by
/// [`crate::MemoryStore`] for tests.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Non-blocking lock acquisition; `false` means another writer holds it.
    async fn try_lock(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Release a held lock. A lock that expired before release is a
    /// [`CacheError::Lock`].
    async fn unlock(&self, key: &str) -> Result<(), CacheError>;

    async fn rpush(&self, key: &str, values: &[String]) -> Result<(), CacheError>;

    async fn lrange(&self, key: &str) -> Result<Vec<String>, CacheError>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Run `write` under the named lock, converting a lost acquisition race
/// into [`CacheError::WriteCollision`]. The lock is released even when
/// the write fails; write errors win over release errors.
pub(crate) async fn locked_write<T, F, Fut>(
    store: &dyn KvStore,
    lock_key: &str,
    write: F,
) -> Result<T, CacheError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, CacheError>>,
{
    if !store.try_lock(lock_key, LOCK_TTL).await? {
        return Err(CacheError::WriteCollision(lock_key.to_string()));
    }
    let result = write().await;
    let released = store.unlock(lock_key).await;
    match result {
        Ok(value) => released.map(|()| value),
        Err(err) => Err(err),
    }
}
