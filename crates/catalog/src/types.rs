// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed view of the catalog document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered environment map; insertion order is preserved so rendered
/// `docker run -e` options follow the catalog's declaration order.
pub type EnvMap = IndexMap<String, EnvValue>;

/// An environment value as written in the catalog.
///
/// Catalog authors use plain YAML scalars (`GPU: true`, `MAX_LEN: 1100`)
/// and occasionally lists; all of them render to the string form passed
/// to the container runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvValue(pub serde_json::Value);

impl EnvValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self(serde_json::Value::String(s.into()))
    }

    /// Render as the `VALUE` half of a `KEY=VALUE` runtime option.
    pub fn render(&self) -> String {
        match &self.0 {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Truthiness for flags like `GPU`: "1", "true", or "yes" (any case).
    pub fn is_truthy(&self) -> bool {
        matches!(self.render().to_lowercase().as_str(), "1" | "true" | "yes")
    }
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        EnvValue::string(s)
    }
}

/// Footprint section of a service definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintConfig {
    /// Seconds the footprinter lets the service run between snapshots.
    #[serde(rename = "run-time", default = "default_run_time")]
    pub run_time: u64,
    #[serde(rename = "run-script", default, skip_serializing_if = "Option::is_none")]
    pub run_script: Option<String>,
}

fn default_run_time() -> u64 {
    30
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self { run_time: default_run_time(), run_script: None }
    }
}

/// Partial footprint section carried by a profile or variety; present
/// fields override the base section field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootprintOverride {
    #[serde(rename = "run-time", default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<u64>,
    #[serde(rename = "run-script", default, skip_serializing_if = "Option::is_none")]
    pub run_script: Option<String>,
}

/// Override layer carried by a profile or a variety.
///
/// Same fields as the base definition minus identity; any field present
/// overrides the base per the layering rules in [`crate::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_file: Vec<String>,
    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub environment: EnvMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<FootprintOverride>,
}

/// One service in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    /// Tag resolved against the service registry (e.g. "container").
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_file: Vec<String>,
    #[serde(default, skip_serializing_if = "EnvMap::is_empty")]
    pub environment: EnvMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<FootprintConfig>,
    /// Profiles accept a map `{name: {...}}` or a list of `{name, ...}`;
    /// both normalize to an ordered map keyed by name.
    #[serde(
        default,
        deserialize_with = "deserialize_profiles",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub profiles: IndexMap<String, OverrideLayer>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub varieties: IndexMap<String, OverrideLayer>,
}

impl ServiceDefinition {
    pub fn has_profiles(&self) -> bool {
        !self.profiles.is_empty()
    }

    pub fn has_varieties(&self) -> bool {
        !self.varieties.is_empty()
    }
}

/// Map-or-list acceptance for the `profiles` key.
fn deserialize_profiles<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, OverrideLayer>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct NamedLayer {
        name: Option<String>,
        #[serde(flatten)]
        layer: OverrideLayer,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Map(IndexMap<String, OverrideLayer>),
        List(Vec<NamedLayer>),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Map(map) => Ok(map),
        Raw::List(entries) => {
            let mut map = IndexMap::new();
            for entry in entries {
                match entry.name {
                    Some(name) if !name.is_empty() => {
                        map.insert(name, entry.layer);
                    }
                    // Malformed entries without a name are skipped
                    _ => tracing::warn!("skipping profile list entry without a name"),
                }
            }
            Ok(map)
        }
    }
}

/// Connection parameters for the shared key-value cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: String,
    #[serde(default)]
    pub parameters: CacheParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheParameters {
    #[serde(default = "default_cache_host")]
    pub host: String,
    #[serde(default = "default_cache_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_cache_host() -> String {
    "localhost".to_string()
}

fn default_cache_port() -> u16 {
    6379
}

impl Default for CacheParameters {
    fn default() -> Self {
        Self {
            host: default_cache_host(),
            port: default_cache_port(),
            db: 0,
            password: None,
        }
    }
}

/// A provisioner entry: which host it serves and which cache it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provisioner {
    pub name: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

/// Host entry; informational for the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    pub ip: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<oz_core::Resource>,
}

/// The whole catalog document. Immutable after load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
    #[serde(default)]
    pub provisioners: Vec<Provisioner>,
}

impl Catalog {
    /// Look up a service definition by name.
    pub fn get_service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
