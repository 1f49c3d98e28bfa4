// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use super::*;

#[test]
fn update_with_services_spec_parses() {
    let cli = Cli::try_parse_from([
        "ozwald",
        "update",
        "--services",
        "a[svc1],b[multi][v1][p1]",
    ])
    .unwrap();
    match cli.command {
        Command::Update { services, clear } => {
            assert_eq!(services.as_deref(), Some("a[svc1],b[multi][v1][p1]"));
            assert!(!clear);
        }
        _ => panic!("expected update command"),
    }
}

#[test]
fn update_clear_conflicts_with_services() {
    let result =
        Cli::try_parse_from(["ozwald", "update", "--clear", "--services", "a[svc1]"]);
    assert!(result.is_err());
}

#[test]
fn footprint_request_all_conflicts_with_services() {
    let result = Cli::try_parse_from([
        "ozwald",
        "footprint",
        "request",
        "--all",
        "--services",
        "a[svc1]",
    ]);
    assert!(result.is_err());
}

#[test]
fn port_is_global_and_defaults_to_8000() {
    let cli = Cli::try_parse_from(["ozwald", "active"]).unwrap();
    assert_eq!(cli.port, 8000);

    let cli = Cli::try_parse_from(["ozwald", "active", "--port", "9000"]).unwrap();
    assert_eq!(cli.port, 9000);
}

#[test]
fn logs_accepts_window_options() {
    let cli = Cli::try_parse_from([
        "ozwald", "logs", "svc1", "--realm", "lab", "--last", "10",
    ])
    .unwrap();
    match cli.command {
        Command::Logs { service, realm, last, top, .. } => {
            assert_eq!(service, "svc1");
            assert_eq!(realm, "lab");
            assert_eq!(last, Some(10));
            assert_eq!(top, None);
        }
        _ => panic!("expected logs command"),
    }
}

#[test]
fn explicit_key_wins_over_the_environment() {
    let key = system_key(Some("cli-key".to_string())).unwrap();
    assert_eq!(key, "cli-key");
}

#[test]
fn missing_key_is_a_config_error() {
    // No --key; the environment may or may not carry one, so only assert
    // the explicit-empty case.
    let err = system_key(Some(String::new()));
    assert!(matches!(err, Err(CliError::Config(_))));
}
