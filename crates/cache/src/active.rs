// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desired-state document: the list of instances this host should run.

use std::sync::Arc;

use oz_core::ServiceInformation;

use crate::store::{locked_write, CacheError, KvStore};

const CACHE_KEY: &str = "active_services";
const LOCK_KEY: &str = "active_services:lock";

/// Cache of the desired-state list under `active_services`.
///
/// `set` is the linearization point: last writer wins at the document
/// level, with collisions surfaced rather than blocked on.
#[derive(Clone)]
pub struct ActiveServicesCache {
    store: Arc<dyn KvStore>,
}

impl ActiveServicesCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the current list; an absent key is an empty list.
    pub async fn get(&self) -> Result<Vec<ServiceInformation>, CacheError> {
        match self.store.get(CACHE_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Serialize and write the whole list under the write lock.
    pub async fn set(&self, services: &[ServiceInformation]) -> Result<(), CacheError> {
        let json = serde_json::to_string(services)?;
        locked_write(self.store.as_ref(), LOCK_KEY, || async {
            self.store.set(CACHE_KEY, &json).await
        })
        .await
    }
}

#[cfg(test)]
#[path = "active_tests.rs"]
mod tests;
