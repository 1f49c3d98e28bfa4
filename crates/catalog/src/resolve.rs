// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effective-definition resolution.
//!
//! Layering is base ← variety ← profile:
//! - scalar fields: first non-empty wins in order profile, variety, base
//! - list fields: first non-empty list wins (replacement, not concatenation)
//! - environment: three-way merge with later layers overriding keys
//! - footprint: field-level override, profile > variety > base

use thiserror::Error;

use crate::types::{
    Catalog, EnvMap, FootprintConfig, OverrideLayer, ServiceDefinition,
};

/// Errors from resolving a (service, profile, variety) selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("unknown profile '{profile}' for service '{service}'")]
    UnknownProfile { service: String, profile: String },

    #[error("unknown variety '{variety}' for service '{service}'")]
    UnknownVariety { service: String, variety: String },

    #[error("service '{service}' requires a {dimension} selection")]
    SelectionRequired { service: String, dimension: &'static str },

    #[error(
        "ambiguous or unknown token '{token}' for service '{service}' \
         (varieties: {varieties}; profiles: {profiles})"
    )]
    AmbiguousToken {
        service: String,
        token: String,
        varieties: String,
        profiles: String,
    },
}

/// The merged, per-instance view of a service definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveDefinition {
    pub image: String,
    pub command: Option<String>,
    pub entrypoint: Option<String>,
    pub depends_on: Vec<String>,
    pub env_file: Vec<String>,
    pub environment: EnvMap,
    pub footprint: FootprintConfig,
}

/// First non-empty scalar in precedence order.
fn choose_scalar(layers: [Option<&str>; 3]) -> Option<String> {
    layers
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .map(String::from)
}

/// First non-empty list in precedence order.
fn choose_list(layers: [&[String]; 3]) -> Vec<String> {
    layers
        .into_iter()
        .find(|l| !l.is_empty())
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

impl Catalog {
    /// Compute the effective definition for an instance selection.
    ///
    /// Pure function of the catalog; no I/O. Enforces that declared
    /// profile/variety dimensions are selected.
    pub fn effective_definition(
        &self,
        service_name: &str,
        profile: Option<&str>,
        variety: Option<&str>,
    ) -> Result<EffectiveDefinition, ResolveError> {
        let def = self
            .get_service(service_name)
            .ok_or_else(|| ResolveError::UnknownService(service_name.to_string()))?;

        let p = lookup_layer(def, &def.profiles, profile, "profile")?;
        let v = lookup_layer(def, &def.varieties, variety, "variety")?;

        Ok(merge_layers(def, v, p))
    }
}

fn lookup_layer<'a>(
    def: &ServiceDefinition,
    layers: &'a indexmap::IndexMap<String, OverrideLayer>,
    selected: Option<&str>,
    dimension: &'static str,
) -> Result<Option<&'a OverrideLayer>, ResolveError> {
    match selected {
        Some(name) => layers.get(name).map(Some).ok_or_else(|| match dimension {
            "profile" => ResolveError::UnknownProfile {
                service: def.name.clone(),
                profile: name.to_string(),
            },
            _ => ResolveError::UnknownVariety {
                service: def.name.clone(),
                variety: name.to_string(),
            },
        }),
        None if layers.is_empty() => Ok(None),
        None => Err(ResolveError::SelectionRequired { service: def.name.clone(), dimension }),
    }
}

fn merge_layers(
    base: &ServiceDefinition,
    variety: Option<&OverrideLayer>,
    profile: Option<&OverrideLayer>,
) -> EffectiveDefinition {
    let v = variety.cloned().unwrap_or_default();
    let p = profile.cloned().unwrap_or_default();

    // Environment: base ∪ variety ∪ profile, later layers override keys
    let mut environment = base.environment.clone();
    for (k, val) in &v.environment {
        environment.insert(k.clone(), val.clone());
    }
    for (k, val) in &p.environment {
        environment.insert(k.clone(), val.clone());
    }

    // Footprint: field-level, profile > variety > base
    let base_fp = base.footprint.clone().unwrap_or_default();
    let footprint = FootprintConfig {
        run_time: p
            .footprint
            .as_ref()
            .and_then(|f| f.run_time)
            .or_else(|| v.footprint.as_ref().and_then(|f| f.run_time))
            .unwrap_or(base_fp.run_time),
        run_script: p
            .footprint
            .as_ref()
            .and_then(|f| f.run_script.clone())
            .or_else(|| v.footprint.as_ref().and_then(|f| f.run_script.clone()))
            .or(base_fp.run_script),
    };

    EffectiveDefinition {
        image: choose_scalar([
            p.image.as_deref(),
            v.image.as_deref(),
            base.image.as_deref(),
        ])
        .unwrap_or_default(),
        command: choose_scalar([
            p.command.as_deref(),
            v.command.as_deref(),
            base.command.as_deref(),
        ]),
        entrypoint: choose_scalar([
            p.entrypoint.as_deref(),
            v.entrypoint.as_deref(),
            base.entrypoint.as_deref(),
        ]),
        depends_on: choose_list([&p.depends_on, &v.depends_on, &base.depends_on]),
        env_file: choose_list([&p.env_file, &v.env_file, &base.env_file]),
        environment,
        footprint,
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
