// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations: parse, call the API, print.

use oz_catalog::{parse_spec, Catalog, InstanceSpec};

use crate::client::ApiClient;
use crate::display;
use crate::CliError;

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Parse a spec string against the local catalog (`OZWALD_CONFIG`).
fn parse_instance_specs(spec: &str) -> Result<Vec<InstanceSpec>, CliError> {
    let path = std::env::var("OZWALD_CONFIG").unwrap_or_else(|_| "ozwald.yml".to_string());
    let catalog = Catalog::load(&path).map_err(|e| {
        CliError::Config(format!("cannot read catalog for spec parsing ({path}): {e}"))
    })?;
    parse_spec(spec, &catalog).map_err(|e| CliError::Config(e.to_string()))
}

fn specs_to_json(specs: &[InstanceSpec]) -> serde_json::Value {
    serde_json::Value::Array(
        specs
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "service": s.service,
                    "profile": s.profile,
                    "variety": s.variety,
                })
            })
            .collect(),
    )
}

pub async fn configured(client: &ApiClient) -> Result<(), CliError> {
    let services = client.get("/srv/services/configured/").await?;
    print!("{}", display::render_configured(&services));
    Ok(())
}

pub async fn active(client: &ApiClient) -> Result<(), CliError> {
    let services = client.get("/srv/services/active/").await?;
    print!("{}", display::render_active(&services));
    Ok(())
}

pub async fn update(
    client: &ApiClient,
    services: Option<&str>,
    clear: bool,
) -> Result<(), CliError> {
    let body = if clear {
        serde_json::Value::Array(Vec::new())
    } else {
        let spec = services.ok_or_else(|| {
            CliError::Config("a services specification is required unless --clear".to_string())
        })?;
        specs_to_json(&parse_instance_specs(spec)?)
    };

    let response = client.post("/srv/services/dynamic/update/", &body).await?;
    println!("service update accepted: {}", pretty(&response));
    Ok(())
}

pub async fn resources(client: &ApiClient) -> Result<(), CliError> {
    let resources = client.get("/srv/resources/available/").await?;
    println!("{}", pretty(&resources));
    Ok(())
}

pub async fn footprint_list(client: &ApiClient) -> Result<(), CliError> {
    let requests = client.get("/srv/services/footprint").await?;
    println!("{}", pretty(&requests));
    Ok(())
}

pub async fn footprint_request(
    client: &ApiClient,
    all: bool,
    services: Option<&str>,
) -> Result<(), CliError> {
    let body = if all {
        serde_json::json!({ "footprint_all_services": true })
    } else {
        let spec = services.ok_or_else(|| {
            CliError::Config("pass --all or --services to select footprint targets".to_string())
        })?;
        let targets: Vec<serde_json::Value> = parse_instance_specs(spec)?
            .into_iter()
            .map(|s| {
                serde_json::json!({
                    "service_name": s.service,
                    "profile": s.profile,
                    "variety": s.variety,
                })
            })
            .collect();
        serde_json::json!({ "services": targets })
    };

    let response = client.post("/srv/services/footprint", &body).await?;
    println!("footprint request accepted: {}", pretty(&response));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn logs(
    client: &ApiClient,
    service: &str,
    realm: &str,
    profile: Option<String>,
    variety: Option<String>,
    top: Option<usize>,
    last: Option<usize>,
) -> Result<(), CliError> {
    let mut query = vec![format!("realm={realm}")];
    if let Some(profile) = profile {
        query.push(format!("profile={profile}"));
    }
    if let Some(variety) = variety {
        query.push(format!("variety={variety}"));
    }
    if let Some(top) = top {
        query.push(format!("top={top}"));
    }
    if let Some(last) = last {
        query.push(format!("last={last}"));
    }

    let path = format!("/srv/services/logs/{service}/?{}", query.join("&"));
    let response = client.get(&path).await?;

    match response.get("lines").and_then(|l| l.as_array()) {
        Some(lines) => {
            for line in lines {
                if let Some(text) = line.as_str() {
                    println!("{text}");
                }
            }
        }
        None => println!("{}", pretty(&response)),
    }
    Ok(())
}
