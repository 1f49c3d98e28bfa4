// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`KvStore`] with real lock semantics, for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::store::{CacheError, KvStore};

#[derive(Default)]
struct Inner {
    values: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
    /// Lock key → expiry instant.
    locks: HashMap<String, Instant>,
    /// Last TTL applied per key, for assertions.
    ttls: HashMap<String, Duration>,
    set_calls: usize,
}

/// Store fake mirroring the Redis lock discipline: non-blocking acquire,
/// TTL expiry, and a lock fault on releasing an expired lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a concurrent writer by holding a lock for `ttl`.
    pub fn hold_lock(&self, key: &str, ttl: Duration) {
        self.inner.lock().locks.insert(key.to_string(), Instant::now() + ttl);
    }

    /// Last TTL applied to a key via `expire`.
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.inner.lock().ttls.get(key).copied()
    }

    pub fn raw_value(&self, key: &str) -> Option<String> {
        self.inner.lock().values.get(key).cloned()
    }

    /// Number of `set` calls observed, for write-count assertions.
    pub fn set_calls(&self) -> usize {
        self.inner.lock().set_calls
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.lock().values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.lock();
        inner.set_calls += 1;
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn try_lock(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        if let Some(expiry) = inner.locks.get(key) {
            if *expiry > now {
                return Ok(false);
            }
        }
        inner.locks.insert(key.to_string(), now + ttl);
        Ok(true)
    }

    async fn unlock(&self, key: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.lock();
        match inner.locks.remove(key) {
            Some(expiry) if expiry > Instant::now() => Ok(()),
            _ => Err(CacheError::Lock {
                key: key.to_string(),
                reason: "lock expired before release".to_string(),
            }),
        }
    }

    async fn rpush(&self, key: &str, values: &[String]) -> Result<(), CacheError> {
        self.inner
            .lock()
            .lists
            .entry(key.to_string())
            .or_default()
            .extend(values.iter().cloned());
        Ok(())
    }

    async fn lrange(&self, key: &str) -> Result<Vec<String>, CacheError> {
        Ok(self.inner.lock().lists.get(key).cloned().unwrap_or_default())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        self.inner.lock().ttls.insert(key.to_string(), ttl);
        Ok(())
    }
}
