// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable rendering of API responses.

use serde_json::Value;

fn push_field(out: &mut String, indent: &str, label: &str, value: &str) {
    out.push_str(indent);
    out.push_str(label);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn render_environment(out: &mut String, indent: &str, env: Option<&Value>) {
    let Some(map) = env.and_then(Value::as_object) else { return };
    if map.is_empty() {
        return;
    }
    out.push_str(indent);
    out.push_str("Environment:\n");
    for (key, value) in map {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        push_field(out, &format!("{indent}  "), key, &rendered);
    }
}

/// Render the configured-services response as an operator listing.
pub fn render_configured(services: &Value) -> String {
    let Some(list) = services.as_array() else {
        return services.to_string();
    };

    let mut out = String::new();
    for (i, service) in list.iter().enumerate() {
        let name = service["name"].as_str().unwrap_or("N/A");
        out.push_str(&format!("[{i}] Service: {name}\n"));

        if let Some(svc_type) = service["type"].as_str() {
            push_field(&mut out, "  ", "Type", svc_type);
        }
        if let Some(description) = service["description"].as_str() {
            push_field(&mut out, "  ", "Description", description);
        }
        if let Some(image) = service["image"].as_str() {
            push_field(&mut out, "  ", "Image", image);
        }

        let depends_on = string_list(service.get("depends_on"));
        if !depends_on.is_empty() {
            push_field(&mut out, "  ", "Depends on", &depends_on.join(", "));
        }
        let env_files = string_list(service.get("env_file"));
        if !env_files.is_empty() {
            push_field(&mut out, "  ", "Env files", &env_files.join(", "));
        }
        render_environment(&mut out, "  ", service.get("environment"));

        if let Some(profiles) = service.get("profiles").and_then(Value::as_object) {
            if !profiles.is_empty() {
                out.push_str("  Profiles:\n");
                for (profile_name, profile) in profiles {
                    out.push_str(&format!("    - {profile_name}\n"));
                    if let Some(image) = profile["image"].as_str() {
                        push_field(&mut out, "      ", "Image", image);
                    }
                    render_environment(&mut out, "      ", profile.get("environment"));
                }
            }
        }
        if let Some(varieties) = service.get("varieties").and_then(Value::as_object) {
            if !varieties.is_empty() {
                out.push_str("  Varieties:\n");
                for (variety_name, variety) in varieties {
                    out.push_str(&format!("    - {variety_name}\n"));
                    if let Some(image) = variety["image"].as_str() {
                        push_field(&mut out, "      ", "Image", image);
                    }
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Render active instances as one status line each.
pub fn render_active(services: &Value) -> String {
    let Some(list) = services.as_array() else {
        return services.to_string();
    };
    if list.is_empty() {
        return "no active services\n".to_string();
    }

    let mut out = String::new();
    for instance in list {
        let name = instance["name"].as_str().unwrap_or("?");
        let service = instance["service"].as_str().unwrap_or("?");
        let status = instance["status"].as_str().unwrap_or("?");
        let mut line = format!("{name} [{service}] {status}");
        if let Some(profile) = instance["profile"].as_str() {
            line.push_str(&format!(" profile={profile}"));
        }
        if let Some(variety) = instance["variety"].as_str() {
            line.push_str(&format!(" variety={variety}"));
        }
        if let Some(container) = instance["info"]["container_id"].as_str() {
            line.push_str(&format!(" container={container}"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
