// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bracket-token instance specs: `NAME[service][variety-or-profile][profile]`.
//!
//! The second token is disambiguated against the definition's profile and
//! variety namespaces; an empty token (`[]`) skips its dimension. A token
//! matching both namespaces, or neither, is [`ResolveError::AmbiguousToken`].

use crate::resolve::ResolveError;
use crate::types::{Catalog, ServiceDefinition};

/// A parsed instance spec entry, ready to post to the update endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub name: String,
    pub service: String,
    pub profile: Option<String>,
    pub variety: Option<String>,
}

/// Parse a comma-separated list of spec entries.
pub fn parse_spec(spec: &str, catalog: &Catalog) -> Result<Vec<InstanceSpec>, ResolveError> {
    let entries: Vec<&str> = spec.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if entries.is_empty() {
        return Err(ResolveError::UnknownService(String::new()));
    }
    entries.into_iter().map(|e| parse_spec_entry(e, catalog)).collect()
}

/// Parse one `NAME[service]...` entry.
pub fn parse_spec_entry(entry: &str, catalog: &Catalog) -> Result<InstanceSpec, ResolveError> {
    let tokens = bracket_tokens(entry);
    let name = entry.split('[').next().unwrap_or_default().trim();
    let service = tokens.first().map(|t| t.trim()).unwrap_or_default();
    if name.is_empty() || service.is_empty() {
        return Err(ResolveError::UnknownService(service.to_string()));
    }

    let def = catalog
        .get_service(service)
        .ok_or_else(|| ResolveError::UnknownService(service.to_string()))?;

    let (profile, variety) = resolve_tokens(
        def,
        tokens.get(1).map(|t| t.trim()),
        tokens.get(2).map(|t| t.trim()),
    )?;

    Ok(InstanceSpec {
        name: name.to_string(),
        service: service.to_string(),
        profile,
        variety,
    })
}

fn bracket_tokens(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']') else { break };
        tokens.push(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    tokens
}

/// Disambiguate the second and third bracket tokens.
fn resolve_tokens(
    def: &ServiceDefinition,
    tok2: Option<&str>,
    tok3: Option<&str>,
) -> Result<(Option<String>, Option<String>), ResolveError> {
    let mut profile: Option<String> = None;
    let mut variety: Option<String> = None;

    if let Some(tok) = tok2 {
        if tok.is_empty() {
            // explicit empty skips the variety dimension
        } else if def.has_profiles() && !def.has_varieties() {
            if !def.profiles.contains_key(tok) {
                return Err(ResolveError::UnknownProfile {
                    service: def.name.clone(),
                    profile: tok.to_string(),
                });
            }
            profile = Some(tok.to_string());
        } else if def.has_varieties() && !def.has_profiles() {
            if !def.varieties.contains_key(tok) {
                return Err(ResolveError::UnknownVariety {
                    service: def.name.clone(),
                    variety: tok.to_string(),
                });
            }
            variety = Some(tok.to_string());
        } else if def.has_varieties() || def.has_profiles() {
            let in_variety = def.varieties.contains_key(tok);
            let in_profile = def.profiles.contains_key(tok);
            match (in_variety, in_profile) {
                (true, false) => variety = Some(tok.to_string()),
                (false, true) => profile = Some(tok.to_string()),
                _ => return Err(ambiguous(def, tok)),
            }
        } else {
            // No dimensions declared but a token was supplied
            return Err(ambiguous(def, tok));
        }
    }

    if let Some(tok) = tok3 {
        if tok.is_empty() {
            profile = None;
        } else if def.has_profiles() && !def.profiles.contains_key(tok) {
            return Err(ResolveError::UnknownProfile {
                service: def.name.clone(),
                profile: tok.to_string(),
            });
        } else {
            profile = Some(tok.to_string());
        }
    }

    Ok((profile, variety))
}

fn ambiguous(def: &ServiceDefinition, token: &str) -> ResolveError {
    let join = |keys: Vec<&String>| {
        if keys.is_empty() {
            "<none>".to_string()
        } else {
            let mut names: Vec<&str> = keys.into_iter().map(String::as_str).collect();
            names.sort_unstable();
            names.join(", ")
        }
    };
    ResolveError::AmbiguousToken {
        service: def.name.clone(),
        token: token.to_string(),
        varieties: join(def.varieties.keys().collect()),
        profiles: join(def.profiles.keys().collect()),
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
