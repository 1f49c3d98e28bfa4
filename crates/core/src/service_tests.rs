// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    starting  = { ServiceStatus::Starting, "starting" },
    available = { ServiceStatus::Available, "available" },
    stopping  = { ServiceStatus::Stopping, "stopping" },
)]
fn status_round_trips_as_lowercase_string(status: ServiceStatus, text: &str) {
    assert_eq!(status.as_str(), text);
    assert_eq!(text.parse::<ServiceStatus>().unwrap(), status);

    let json = serde_json::to_string(&status).unwrap();
    assert_eq!(json, format!("\"{text}\""));
    let back: ServiceStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status);
}

#[test]
fn unknown_status_string_is_rejected() {
    assert!("running".parse::<ServiceStatus>().is_err());
    assert!(serde_json::from_str::<ServiceStatus>("\"removed\"").is_err());
}

#[test]
fn instance_defaults_realm_and_omits_absent_selection() {
    let inst = ServiceInformation::starting("a", "svc1");
    assert_eq!(inst.realm, "default");

    let json = serde_json::to_value(&inst).unwrap();
    assert!(json.get("profile").is_none());
    assert!(json.get("variety").is_none());
    assert_eq!(json["status"], "starting");
}

#[test]
fn instance_deserializes_without_realm_or_info() {
    let inst: ServiceInformation = serde_json::from_str(
        r#"{"name":"a","service":"svc1","status":"available"}"#,
    )
    .unwrap();
    assert_eq!(inst.realm, "default");
    assert!(inst.info.is_empty());
}

#[test]
fn merge_info_from_prefers_fresher_values() {
    let mut local = ServiceInformation::starting("a", "svc1");
    local.set_info(info_keys::START_INITIATED, "old");
    local.set_info("local_only", "kept");

    let mut fresher = local.clone();
    fresher.set_info(info_keys::START_INITIATED, "new");
    fresher.set_info(info_keys::CONTAINER_ID, "abc123");

    local.merge_info_from(&fresher);
    assert_eq!(local.info_value(info_keys::START_INITIATED), Some("new"));
    assert_eq!(local.info_value(info_keys::CONTAINER_ID), Some("abc123"));
    assert_eq!(local.info_value("local_only"), Some("kept"));
}

#[test]
fn stopped_requires_stopping_status_and_completion_marker() {
    let mut inst = ServiceInformation::starting("a", "svc1");
    assert!(!inst.is_stopped());

    inst.status = ServiceStatus::Stopping;
    assert!(!inst.is_stopped());

    inst.set_info(info_keys::STOP_COMPLETED, "2026-03-01T12:00:00+00:00");
    assert!(inst.is_stopped());

    // An AVAILABLE instance with a stale marker is not elidable
    inst.status = ServiceStatus::Available;
    assert!(!inst.is_stopped());
}
