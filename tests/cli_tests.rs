//! Integration tests for the abplan command line
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use predicates::prelude::*;
use std::io::Write;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_compute_sample_size_text() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args([
        "compute",
        "--metric",
        "CR",
        "--real-estate",
        "home",
        "--mean",
        "0.05",
        "--variance",
        "0.0475",
        "--mde",
        "0.1",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sample size per variant: 29792"))
        .stdout(predicate::str::contains("total sample size:       59584"))
        .stdout(predicate::str::contains("Warnings:").not());
}

#[test]
fn test_compute_mde_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args([
        "compute",
        "--metric",
        "CR",
        "--real-estate",
        "home",
        "--mean",
        "0.05",
        "--sample-size",
        "29792",
        "--format",
        "json",
    ]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "abplan-json-v1");
    assert_eq!(json["result"]["mode"], "sampleSizeToMde");
    let mde = json["result"]["minimumDetectableEffect"].as_f64().unwrap();
    assert!((mde - 0.10).abs() < 1e-6);
}

#[test]
fn test_compute_degenerate_input_still_succeeds() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args([
        "compute",
        "--metric",
        "AOV",
        "--real-estate",
        "checkout",
        "--metric-type",
        "continuous",
        "--mean",
        "0",
        "--variance",
        "100",
        "--sample-size",
        "1000",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("minimum detectable effect: -"))
        .stdout(predicate::str::contains("mean must be positive"));
}

#[test]
fn test_compute_requires_target() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args(["compute", "--metric", "CR", "--real-estate", "home"]);
    cmd.assert().failure();
}

#[test]
fn test_compute_uses_builtin_catalog() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args([
        "compute",
        "--metric",
        "CR",
        "--real-estate",
        "home",
        "--duration",
        "14",
        "--mde",
        "0.1",
        "--builtin-catalog",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sample size per variant: 29792"))
        .stdout(predicate::str::contains(
            "used specific historical data for duration 14 days",
        ));
}

#[test]
fn test_sweep_sorted_rows() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args([
        "sweep",
        "--metric",
        "CR",
        "--real-estate",
        "home",
        "--mean",
        "0.05",
        "--mde",
        "0.05",
        "--durations",
        "21,7,14",
        "--format",
        "json",
    ]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let days: Vec<u64> = json["sweep"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["durationDays"].as_u64().unwrap())
        .collect();
    assert_eq!(days, vec![7, 14, 21]);
    assert!(json["sweep"][0]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w == "baseline daily traffic not provided"));
}

#[test]
fn test_sweep_with_catalog_file() {
    let catalog = write_temp(
        ".toml",
        r#"
[[observation]]
metric = "AOV"
real_estate = "checkout"
metric_type = "continuous"
lookback_days = 14
mean = 52.0
variance = 1900.0
total_users = 60000
"#,
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args([
        "sweep",
        "--metric",
        "AOV",
        "--real-estate",
        "checkout",
        "--metric-type",
        "continuous",
        "--mean",
        "50",
        "--variance",
        "2000",
        "--daily-traffic",
        "4000",
        "--mde",
        "0.05",
        "--durations",
        "7,14",
        "--catalog",
    ])
    .arg(catalog.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("historical"))
        .stdout(predicate::str::contains("baseline"))
        .stdout(predicate::str::contains(
            "used baseline projection for duration 7 days",
        ));
}

#[test]
fn test_missing_catalog_file_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args(["catalog", "--catalog", "/nonexistent/catalog.toml"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load catalog"));
}

#[test]
fn test_catalog_listing() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.arg("catalog");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CR"))
        .stdout(predicate::str::contains("home"))
        .stdout(predicate::str::contains("7, 14, 21, 28 days"));
}

#[test]
fn test_config_ceiling_applies() {
    let config = write_temp(".toml", "max_duration_days = 7\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args([
        "compute",
        "--metric",
        "CR",
        "--real-estate",
        "home",
        "--mean",
        "0.05",
        "--mde",
        "0.1",
        "--daily-traffic",
        "5000",
        "--config",
    ])
    .arg(config.path());

    // 59,584 users at 5,000 per day: 12 days
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("estimated duration:      12 days"))
        .stdout(predicate::str::contains("exceeds the 7-day ceiling"));
}

#[test]
fn test_invalid_config_fails() {
    let config = write_temp(".toml", "max_duration_days = 0\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("abplan");
    cmd.args(["catalog", "--config"]).arg(config.path());
    cmd.assert().failure();
}
