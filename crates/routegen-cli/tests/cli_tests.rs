//! Integration tests for the routegen CLI.
//!
//! These tests use `assert_cmd` to verify:
//! - text and JSON output of `generate`
//! - render plans written to stdout and to files
//! - cell inspection and error exit codes

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/small_world.json")
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("routegen-cli").expect("binary exists");
    cmd.env("NO_COLOR", "1").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn generate_prints_text_summary() {
    cli()
        .arg("--map")
        .arg(fixture_path())
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"))
        .stdout(predicate::str::contains("road0:"))
        .stdout(predicate::str::contains("searoute0:"));
}

#[test]
fn generate_json_is_parseable() {
    let output = cli()
        .arg("--map")
        .arg(fixture_path())
        .args(["generate", "--format", "json"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert!(report["summary"]["main_segments"].as_u64().unwrap() >= 1);
    let main = report["network"]["main"].as_array().expect("main array");
    assert_eq!(main[0]["category"], "main");
    assert!(main[0]["cells"].as_array().unwrap().len() >= 2);
}

#[test]
fn relaxed_search_mode_is_accepted() {
    cli()
        .arg("--map")
        .arg(fixture_path())
        .args(["--search-mode", "relaxed", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"));
}

#[test]
fn render_writes_plan_to_file() {
    let temp = TempDir::new().expect("temp dir");
    let target = temp.path().join("plan.json");

    cli()
        .arg("--map")
        .arg(fixture_path())
        .arg("render")
        .arg("--output")
        .arg(&target)
        .assert()
        .success();

    let plan: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).expect("plan written")).unwrap();
    let layers = plan["layers"].as_array().expect("layers");
    assert_eq!(layers.len(), 3);
    assert_eq!(layers[0]["curve"]["kind"], "catmull_rom");
    assert_eq!(layers[0]["paths"][0]["id"], "road0");
}

#[test]
fn render_text_lists_path_data() {
    cli()
        .arg("--map")
        .arg(fixture_path())
        .args(["render", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[main]"))
        .stdout(predicate::str::is_match(r"road0 M[0-9.]+,[0-9.]+L").unwrap());
}

#[test]
fn config_file_overrides_scores() {
    let temp = TempDir::new().expect("temp dir");
    let config = temp.path().join("routing.json");
    fs::write(&config, r#"{"scores": {"main": 9, "trail": 1, "sea": 1}}"#).unwrap();

    let output = cli()
        .arg("--map")
        .arg(fixture_path())
        .arg("--config")
        .arg(&config)
        .args(["generate", "--format", "json"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["summary"]["max_density"].as_u64().unwrap() >= 9);
}

#[test]
fn inspect_reports_settlement_cell() {
    // burg 1 sits at column 2, row 2 of the 14-wide fixture grid
    cli()
        .arg("--map")
        .arg(fixture_path())
        .args(["inspect", "--cell", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cell 30: land"))
        .stdout(predicate::str::contains("Settlement: 1 (capital: true"));
}

#[test]
fn inspect_unknown_cell_fails() {
    cli()
        .arg("--map")
        .arg(fixture_path())
        .args(["inspect", "--cell", "99999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown cell id: 99999"));
}

#[test]
fn missing_map_fails_with_context() {
    cli()
        .args(["--map", "/nonexistent/world.json", "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load map"));
}

#[test]
fn invalid_config_is_rejected() {
    let temp = TempDir::new().expect("temp dir");
    let config = temp.path().join("routing.json");
    fs::write(&config, r#"{"restore_limit": 0}"#).unwrap();

    cli()
        .arg("--map")
        .arg(fixture_path())
        .arg("--config")
        .arg(&config)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("restore_limit must be positive"));
}
