// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog loading and provisioner selection.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::types::{Catalog, Provisioner};

/// Errors raised while loading or interrogating the catalog document.
///
/// All of these are configuration errors: fatal at startup, 400-class
/// when raised during request validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("empty configuration: {0}")]
    Empty(PathBuf),

    #[error("no provisioners found in configuration")]
    NoProvisioners,

    #[error("provisioner '{0}' has no cache configured")]
    NoCache(String),
}

impl Catalog {
    /// Load and parse the catalog from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        if text.trim().is_empty() {
            return Err(CatalogError::Empty(path.to_path_buf()));
        }
        serde_yaml::from_str(&text)
            .map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })
    }

    /// Select the provisioner entry this process runs as.
    ///
    /// An explicit name must match exactly. Without a name, a single
    /// defined provisioner is used; with several defined the first wins.
    pub fn select_provisioner(&self, name: Option<&str>) -> Result<&Provisioner, CatalogError> {
        if let Some(name) = name {
            if let Some(found) = self.provisioners.iter().find(|p| p.name == name) {
                return Ok(found);
            }
            warn!(provisioner = name, "configured provisioner not found, falling back");
        }
        match self.provisioners.as_slice() {
            [] => Err(CatalogError::NoProvisioners),
            [only] => Ok(only),
            [first, ..] => {
                if name.is_none() {
                    warn!(
                        selected = %first.name,
                        "multiple provisioners defined and none selected, using the first"
                    );
                }
                Ok(first)
            }
        }
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
