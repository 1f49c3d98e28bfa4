// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

/// Base env {A:s, X:s}; variety v {A:v, V:v}; profile p {A:p, P:p}.
fn layered_catalog() -> Catalog {
    serde_yaml::from_str(
        r#"
services:
  - name: svc
    type: container
    image: base.img
    environment:
      A: s
      X: s
    varieties:
      v:
        environment:
          A: v
          V: v
    profiles:
      p:
        environment:
          A: p
          P: p
"#,
    )
    .unwrap()
}

#[test]
fn environment_merges_profile_over_variety_over_base() {
    let catalog = layered_catalog();
    let eff = catalog.effective_definition("svc", Some("p"), Some("v")).unwrap();

    let env: Vec<(&str, String)> =
        eff.environment.iter().map(|(k, v)| (k.as_str(), v.render())).collect();
    assert_eq!(
        env,
        vec![
            ("A", "p".to_string()),
            ("X", "s".to_string()),
            ("V", "v".to_string()),
            ("P", "p".to_string()),
        ]
    );
}

#[test]
fn scalar_precedence_is_profile_then_variety_then_base() {
    let catalog: Catalog = serde_yaml::from_str(
        r#"
services:
  - name: svc
    type: container
    image: base.img
    command: base-cmd
    varieties:
      v:
        image: variety.img
    profiles:
      p:
        image: profile.img
      empty:
        image: ""
"#,
    )
    .unwrap();

    let eff = catalog.effective_definition("svc", Some("p"), Some("v")).unwrap();
    assert_eq!(eff.image, "profile.img");
    assert_eq!(eff.command.as_deref(), Some("base-cmd"));

    // A blank profile image falls through to the variety layer
    let eff = catalog.effective_definition("svc", Some("empty"), Some("v")).unwrap();
    assert_eq!(eff.image, "variety.img");
}

#[test]
fn list_fields_replace_rather_than_concatenate() {
    let catalog: Catalog = serde_yaml::from_str(
        r#"
services:
  - name: svc
    type: container
    depends_on: [base-dep]
    env_file: [base.env]
    profiles:
      p:
        depends_on: [profile-dep]
      quiet: {}
"#,
    )
    .unwrap();

    let eff = catalog.effective_definition("svc", Some("p"), None).unwrap();
    assert_eq!(eff.depends_on, ["profile-dep"]);
    assert_eq!(eff.env_file, ["base.env"]);

    let eff = catalog.effective_definition("svc", Some("quiet"), None).unwrap();
    assert_eq!(eff.depends_on, ["base-dep"]);
}

#[test]
fn footprint_overrides_apply_field_by_field() {
    let catalog: Catalog = serde_yaml::from_str(
        r#"
services:
  - name: app
    type: container
    footprint:
      run-time: 100
      run-script: base.sh
    profiles:
      prod:
        footprint:
          run-time: 200
      plain: {}
    varieties:
      gpu:
        footprint:
          run-script: gpu.sh
      stock: {}
"#,
    )
    .unwrap();

    let base = catalog.effective_definition("app", Some("plain"), Some("stock")).unwrap();
    assert_eq!(base.footprint.run_time, 100);
    assert_eq!(base.footprint.run_script.as_deref(), Some("base.sh"));

    let prod = catalog.effective_definition("app", Some("prod"), Some("stock")).unwrap();
    assert_eq!(prod.footprint.run_time, 200);
    assert_eq!(prod.footprint.run_script.as_deref(), Some("base.sh"));

    let gpu = catalog.effective_definition("app", Some("plain"), Some("gpu")).unwrap();
    assert_eq!(gpu.footprint.run_time, 100);
    assert_eq!(gpu.footprint.run_script.as_deref(), Some("gpu.sh"));

    let both = catalog.effective_definition("app", Some("prod"), Some("gpu")).unwrap();
    assert_eq!(both.footprint.run_time, 200);
    assert_eq!(both.footprint.run_script.as_deref(), Some("gpu.sh"));
}

#[test]
fn footprint_run_time_defaults_when_absent() {
    let catalog: Catalog = serde_yaml::from_str(
        "services:\n  - name: app\n    type: container\n",
    )
    .unwrap();
    let eff = catalog.effective_definition("app", None, None).unwrap();
    assert_eq!(eff.footprint.run_time, 30);
}

#[test]
fn unknown_selections_are_specific_errors() {
    let catalog = layered_catalog();

    assert_eq!(
        catalog.effective_definition("missing", None, None).unwrap_err(),
        ResolveError::UnknownService("missing".to_string())
    );
    assert!(matches!(
        catalog.effective_definition("svc", Some("nope"), Some("v")).unwrap_err(),
        ResolveError::UnknownProfile { .. }
    ));
    assert!(matches!(
        catalog.effective_definition("svc", Some("p"), Some("nope")).unwrap_err(),
        ResolveError::UnknownVariety { .. }
    ));
}

#[yare::parameterized(
    missing_profile = { None, Some("v"), "profile" },
    missing_variety = { Some("p"), None, "variety" },
)]
fn declared_dimensions_require_a_selection(
    profile: Option<&str>,
    variety: Option<&str>,
    dimension: &str,
) {
    let catalog = layered_catalog();
    match catalog.effective_definition("svc", profile, variety).unwrap_err() {
        ResolveError::SelectionRequired { dimension: d, .. } => assert_eq!(d, dimension),
        other => panic!("expected SelectionRequired, got {other:?}"),
    }
}
