// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-container runner log lines with a 48-hour TTL.

use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::store::{CacheError, KvStore};

const TTL: Duration = Duration::from_secs(48 * 3600);

/// Log-line lists under `runner_logs:<container_name>`.
///
/// Best-effort: write failures are logged, never propagated, so a flaky
/// cache cannot fail a service start.
#[derive(Clone)]
pub struct RunnerLogsCache {
    store: Arc<dyn KvStore>,
}

impl RunnerLogsCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn key(container_name: &str) -> String {
        format!("runner_logs:{container_name}")
    }

    pub async fn add_lines(&self, container_name: &str, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let key = Self::key(container_name);
        if let Err(e) = self.store.rpush(&key, lines).await {
            error!(container = container_name, error = %e, "failed to append runner logs");
            return;
        }
        if let Err(e) = self.store.expire(&key, TTL).await {
            error!(container = container_name, error = %e, "failed to refresh runner log TTL");
        }
    }

    pub async fn lines(&self, container_name: &str) -> Vec<String> {
        match self.store.lrange(&Self::key(container_name)).await {
            Ok(lines) => lines,
            Err(e) => {
                error!(container = container_name, error = %e, "failed to read runner logs");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_logs_tests.rs"]
mod tests;
