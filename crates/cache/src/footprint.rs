// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO of pending footprint jobs.

use std::sync::Arc;

use oz_core::FootprintRequest;

use crate::store::{locked_write, CacheError, KvStore};

const CACHE_KEY: &str = "footprint_requests";
const LOCK_KEY: &str = "footprint_requests:lock";

/// Queue of footprint requests under `footprint_requests`, with the same
/// lock discipline as the desired-state document.
#[derive(Clone)]
pub struct FootprintQueue {
    store: Arc<dyn KvStore>,
}

impl FootprintQueue {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<FootprintRequest>, CacheError> {
        match self.store.get(CACHE_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn set_all(&self, requests: &[FootprintRequest]) -> Result<(), CacheError> {
        let json = serde_json::to_string(requests)?;
        locked_write(self.store.as_ref(), LOCK_KEY, || async {
            self.store.set(CACHE_KEY, &json).await
        })
        .await
    }

    /// Append one request to the queue, creating it if absent.
    pub async fn append(&self, request: &FootprintRequest) -> Result<(), CacheError> {
        locked_write(self.store.as_ref(), LOCK_KEY, || async {
            let mut current = match self.store.get(CACHE_KEY).await? {
                Some(json) => serde_json::from_str::<Vec<FootprintRequest>>(&json)?,
                None => Vec::new(),
            };
            current.push(request.clone());
            self.store.set(CACHE_KEY, &serde_json::to_string(&current)?).await
        })
        .await
    }

    /// Replace the queued request with the same `request_id`.
    pub async fn update_by_id(&self, request: &FootprintRequest) -> Result<(), CacheError> {
        locked_write(self.store.as_ref(), LOCK_KEY, || async {
            let mut current = match self.store.get(CACHE_KEY).await? {
                Some(json) => serde_json::from_str::<Vec<FootprintRequest>>(&json)?,
                None => Vec::new(),
            };
            let slot = current
                .iter_mut()
                .find(|r| r.request_id == request.request_id)
                .ok_or_else(|| CacheError::NotFound(request.request_id.clone()))?;
            *slot = request.clone();
            self.store.set(CACHE_KEY, &serde_json::to_string(&current)?).await
        })
        .await
    }

    /// Drop the request with the given id, if present.
    pub async fn remove_by_id(&self, request_id: &str) -> Result<(), CacheError> {
        locked_write(self.store.as_ref(), LOCK_KEY, || async {
            let current = match self.store.get(CACHE_KEY).await? {
                Some(json) => serde_json::from_str::<Vec<FootprintRequest>>(&json)?,
                None => Vec::new(),
            };
            let remaining: Vec<FootprintRequest> =
                current.into_iter().filter(|r| r.request_id != request_id).collect();
            self.store.set(CACHE_KEY, &serde_json::to_string(&remaining)?).await
        })
        .await
    }
}

#[cfg(test)]
#[path = "footprint_tests.rs"]
mod tests;
