//! Integration tests for global behavior: help, tags, sorts and exit codes.
//!
//! Invariants:
//! - All tests use the hermetic `dashbrowse_cmd()` helper.

mod common;

use common::dashbrowse_cmd;
use predicates::prelude::*;

#[test]
fn test_help() {
    dashbrowse_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("search")
            .and(predicate::str::contains("tags"))
            .and(predicate::str::contains("sorts")),
    );
}

#[test]
fn test_sorts_table() {
    dashbrowse_cmd()
        .args(["--fresh", "sorts"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("VALUE")
                .and(predicate::str::contains("alpha-asc"))
                .and(predicate::str::contains("alpha-desc")),
        );
}

#[test]
fn test_tags_json_counts_containers() {
    let output = dashbrowse_cmd()
        .args(["--fresh", "-o", "json", "tags"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tags: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        tags,
        serde_json::json!([
            {"term": "infra", "count": 1},
            {"term": "prod", "count": 2},
            {"term": "web", "count": 1}
        ])
    );
}

#[test]
fn test_missing_catalog_exit_code() {
    dashbrowse_cmd()
        .args(["--fresh", "--catalog", "/nonexistent/catalog.json", "sorts"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to load catalog"));
}

#[test]
fn test_invalid_config_exit_code() {
    dashbrowse_cmd()
        .env("DASHBROWSE_GRID_COLUMNS", "0")
        .args(["--fresh", "sorts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("grid_columns"));
}

#[test]
fn test_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"base_path": "/other"}"#).unwrap();

    // The environment outranks the file, so clear the helper's base path.
    dashbrowse_cmd()
        .env_remove("DASHBROWSE_BASE_PATH")
        .args(["--fresh", "--config-path", config.to_str().unwrap()])
        .args(["search", "--keys", "down,enter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Navigate: /grafana/d/cpu"));
}

#[test]
fn test_metrics_flag_prints_prometheus_text() {
    dashbrowse_cmd()
        .args(["--fresh", "--metrics", "search"])
        .assert()
        .success()
        .stderr(predicate::str::contains("dashbrowse_searches_total"));
}
