// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The usage-record file: YAML list of measured service footprints.

use std::path::{Path, PathBuf};

use thiserror::Error;

use oz_core::UsageRecord;

#[derive(Debug, Error)]
pub enum UsageFileError {
    #[error("footprint data path {0} is not writable")]
    NotWritable(PathBuf),

    #[error("parent directory {0} for footprint data does not exist")]
    MissingParent(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid usage data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Usage records at `OZWALD_FOOTPRINT_DATA`, written only by the
/// footprinter, sorted by `(service_name, profile, variety)`.
#[derive(Clone)]
pub struct UsageFile {
    path: PathBuf,
}

impl UsageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Startup check: the file, or its parent directory, must be writable.
    /// The daemon refuses to run otherwise.
    pub fn validate(&self) -> Result<(), UsageFileError> {
        if self.path.exists() {
            return std::fs::OpenOptions::new()
                .append(true)
                .open(&self.path)
                .map(|_| ())
                .map_err(|_| UsageFileError::NotWritable(self.path.clone()));
        }

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        if !parent.is_dir() {
            return Err(UsageFileError::MissingParent(parent.to_path_buf()));
        }
        // Probe writability by creating and removing the file.
        match std::fs::OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(_) => {
                let _ = std::fs::remove_file(&self.path);
                Ok(())
            }
            Err(_) => Err(UsageFileError::NotWritable(self.path.clone())),
        }
    }

    /// Read all records; a missing file is an empty list.
    pub fn load(&self) -> Result<Vec<UsageRecord>, UsageFileError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(UsageFileError::Read { path: self.path.clone(), source }),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(&text)
            .map_err(|source| UsageFileError::Parse { path: self.path.clone(), source })
    }

    /// Insert or replace the record with the same key, keeping the file
    /// sorted by `(service_name, profile, variety)`.
    pub fn upsert(&self, record: UsageRecord) -> Result<(), UsageFileError> {
        let mut records = self.load()?;
        match records.iter_mut().find(|r| r.key() == record.key()) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        records.sort_by(|a, b| {
            let (a_svc, a_prof, a_var) = a.key();
            let (b_svc, b_prof, b_var) = b.key();
            (a_svc, a_prof, a_var).cmp(&(b_svc, b_prof, b_var))
        });

        let text = serde_yaml::to_string(&records)
            .map_err(|source| UsageFileError::Parse { path: self.path.clone(), source })?;
        std::fs::write(&self.path, text)
            .map_err(|source| UsageFileError::Write { path: self.path.clone(), source })
    }
}

#[cfg(test)]
#[path = "usage_tests.rs"]
mod tests;
