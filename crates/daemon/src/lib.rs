// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oz-daemon: the ozwald provisioner daemon.
//!
//! Two workers share one process: the reconciler (a cooperative loop that
//! drives STARTING/STOPPING transitions and the footprinter) and the HTTP
//! control plane. Both read the catalog built at startup and mutate shared
//! state only through the lock-guarded caches.

pub mod api;
pub mod env;
pub mod footprinter;
pub mod provisioner;
pub mod reconciler;
pub mod usage;

pub use provisioner::{DesiredInstance, Provisioner, UpdateError};
pub use reconciler::Reconciler;
pub use usage::{UsageFile, UsageFileError};

use thiserror::Error;

/// Fatal daemon startup errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("OZWALD_SYSTEM_KEY environment variable is not defined")]
    MissingSystemKey,

    #[error("OZWALD_FOOTPRINT_DATA environment variable is not defined")]
    MissingFootprintPath,

    #[error("provisioner '{0}' has no cache configured")]
    NoCache(String),

    #[error(transparent)]
    Catalog(#[from] oz_catalog::CatalogError),

    #[error(transparent)]
    Cache(#[from] oz_cache::CacheError),

    #[error(transparent)]
    UsageFile(#[from] UsageFileError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test_helpers;
