// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container and instance naming conventions.

/// Prefix for every container the provisioner starts.
pub const CONTAINER_PREFIX: &str = "ozsvc";

/// Realm used when a request does not name one.
pub const DEFAULT_REALM: &str = "default";

/// Container name for an instance: `ozsvc--<realm>--<instance_name>`.
pub fn container_name(realm: &str, instance_name: &str) -> String {
    format!("{CONTAINER_PREFIX}--{realm}--{instance_name}")
}

/// Instance name the footprinter synthesizes for a measurement target.
///
/// Absent dimensions render as empty segments, so a service with neither
/// profiles nor varieties measures as `footprinter--<service>----`.
pub fn footprinter_instance_name(
    service: &str,
    profile: Option<&str>,
    variety: Option<&str>,
) -> String {
    format!(
        "footprinter--{service}--{}--{}",
        profile.unwrap_or_default(),
        variety.unwrap_or_default()
    )
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
