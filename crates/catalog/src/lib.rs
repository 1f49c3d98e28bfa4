// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oz-catalog: the declarative service catalog and its resolution rules.
//!
//! The catalog is loaded once at process start and never mutated; reloads
//! require a restart. Resolution layers base ← variety ← profile into an
//! [`EffectiveDefinition`] per instance.

mod loader;
mod resolve;
mod selector;
mod types;

pub use loader::CatalogError;
pub use resolve::{EffectiveDefinition, ResolveError};
pub use selector::{parse_spec, parse_spec_entry, InstanceSpec};
pub use types::{
    CacheConfig, CacheParameters, Catalog, EnvMap, EnvValue, FootprintConfig,
    FootprintOverride, Host, OverrideLayer, Provisioner, ServiceDefinition,
};
