#![allow(deprecated)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Command {
  Command::cargo_bin("pipeline-config").expect("binary should be built")
}

#[test]
fn prints_production_configuration() {
  let temp = tempdir().unwrap();

  cli()
    .args(["--mode", "production", "--quiet", "--root"])
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("\"GenerateSW\""))
    .stdout(predicate::str::contains("\"TerserWebpackPlugin\""))
    .stdout(predicate::str::contains("\"devtool\": false"));
}

#[test]
fn writes_configuration_to_file() {
  let temp = tempdir().unwrap();
  let out = temp.path().join("nested/pipeline.json");

  cli()
    .args(["--mode", "development", "--compact", "--quiet", "--root"])
    .arg(temp.path())
    .arg("--out")
    .arg(&out)
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let written = fs::read_to_string(&out).unwrap();
  let value: serde_json::Value = serde_json::from_str(&written).unwrap();
  assert_eq!(value["mode"], "development");
  assert_eq!(value["devtool"], "cheap-module-source-map");
  assert!(!written.contains('\n'));
}

#[test]
fn rejects_unknown_mode() {
  let temp = tempdir().unwrap();

  cli()
    .args(["--mode", "staging", "--quiet", "--root"])
    .arg(temp.path())
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("invalid build mode `staging`"));
}

#[test]
fn reports_malformed_project_configuration() {
  let temp = tempdir().unwrap();
  fs::write(temp.path().join("pipeline.config.json"), "{").unwrap();

  cli()
    .args(["--mode", "production", "--quiet", "--root"])
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to load project layout"));
}

#[test]
fn invalid_mode_is_reported_before_project_configuration() {
  let temp = tempdir().unwrap();
  fs::write(temp.path().join("pipeline.config.json"), "{").unwrap();

  cli()
    .args(["--mode", "staging", "--quiet", "--root"])
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid build mode `staging`"))
    .stderr(predicate::str::contains("failed to load project layout").not());
}

#[test]
fn emitted_paths_are_absolute_without_explicit_root() {
  let temp = tempdir().unwrap();

  let output = cli()
    .args(["--mode", "production", "--quiet"])
    .current_dir(temp.path())
    .output()
    .unwrap();
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let output_path = value["output"]["path"].as_str().unwrap();
  let template = value["plugins"][1]["options"]["template"].as_str().unwrap();
  assert!(std::path::Path::new(output_path).is_absolute(), "{output_path}");
  assert!(std::path::Path::new(template).is_absolute(), "{template}");
  assert!(output_path.ends_with("dist/") || output_path.ends_with("dist"));
}
