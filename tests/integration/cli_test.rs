//! End-to-end tests for the flowlog binary

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use crate::helpers::{fixtures_dir, load_fixture, temp_fixture, BOOKING_SESSION};

/// Helper to run the flowlog CLI and capture output
fn run_flowlog(args: &[&str], home: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_flowlog"))
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute flowlog");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn fixture_arg() -> String {
    fixtures_dir()
        .join("sample_flow.log")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn stats_json_reports_groups() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_flowlog(&["stats", &fixture_arg(), "--json"], home.path());
    assert_eq!(code, 0);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["by_type"]["tool_execution"]["count"], 2);
    assert_eq!(report["by_type"]["query_total"]["max"], 9.0);
    assert_eq!(report["by_tool"]["weather_api"]["count"], 1);
}

#[test]
fn stats_table_lists_operations() {
    let home = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_flowlog(&["stats", &fixture_arg()], home.path());
    assert_eq!(code, 0);
    assert!(stdout.contains("llm_call"));
    assert!(stdout.contains("booking_api"));
    assert!(stderr.contains("10 records"));
}

#[test]
fn errors_lists_failed_operations() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_flowlog(&["errors", &fixture_arg()], home.path());
    assert_eq!(code, 0);
    assert!(stdout.contains("3 failed operation(s):"));
    assert!(stdout.contains("ServiceUnavailable"));
    assert!(stdout.contains("booking_api (failed)"));
}

#[test]
fn slow_respects_thresholds() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_flowlog(&["slow", &fixture_arg()], home.path());
    assert_eq!(code, 0);
    assert!(stdout.contains("1 slow operation(s):"));
    assert!(stdout.contains("weather_api"));

    let (stdout, _, _) = run_flowlog(
        &["slow", &fixture_arg(), "--tool", "0.5", "--llm", "2", "--query", "1.2"],
        home.path(),
    );
    assert!(stdout.contains("4 slow operation(s):"));
}

#[test]
fn sessions_in_first_seen_order() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_flowlog(&["sessions", &fixture_arg()], home.path());
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Sessions (2):"));
    let weather = stdout.find("20260119-100000").unwrap();
    let booking = stdout.find(BOOKING_SESSION).unwrap();
    assert!(weather < booking);
}

#[test]
fn show_prints_raw_records_of_one_session() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_flowlog(
        &["show", &fixture_arg(), "--session", BOOKING_SESSION],
        home.path(),
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Error Type: ServiceUnavailable"));
    assert!(!stdout.contains("Vienna"));
}

#[test]
fn show_unknown_session_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_flowlog(
        &["show", &fixture_arg(), "--session", "nope"],
        home.path(),
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("No records found for session 'nope'"));
}

#[test]
fn export_writes_both_formats() {
    let (dir, log) = temp_fixture("sample_flow.log");
    let json = dir.path().join("out.json");
    let csv = dir.path().join("out.csv");
    let (stdout, _, code) = run_flowlog(
        &[
            "export",
            log.to_str().unwrap(),
            "--json",
            json.to_str().unwrap(),
            "--csv",
            csv.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Exported 10 records"));

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 10);
    assert_eq!(fs::read_to_string(&csv).unwrap().lines().count(), 11);
}

#[test]
fn export_without_target_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_flowlog(&["export", &fixture_arg()], home.path());
    assert_ne!(code, 0);
    assert!(stderr.contains("Nothing to export"));
}

#[test]
fn missing_log_is_reported() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("missing.log");
    let (_, stderr, code) = run_flowlog(&["errors", missing.to_str().unwrap()], home.path());
    assert_ne!(code, 0);
    assert!(stderr.contains("Log file not found"));
}

#[test]
fn default_log_comes_from_config() {
    let home = TempDir::new().unwrap();
    let logs = home.path().join("logs");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("flow.log"), load_fixture("sample_flow.log")).unwrap();

    let config_dir = home.path().join(".config").join("flowlog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("[logging]\ndirectory = \"{}\"\n", logs.display()),
    )
    .unwrap();

    let (stdout, _, code) = run_flowlog(&["sessions"], home.path());
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Sessions (2):"));
}

#[test]
fn reads_gzip_backups() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("flow.log.1.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder
        .write_all(load_fixture("sample_flow.log").as_bytes())
        .unwrap();
    encoder.finish().unwrap();

    let (stdout, _, code) = run_flowlog(&["errors", path.to_str().unwrap()], home.path());
    assert_eq!(code, 0);
    assert!(stdout.contains("3 failed operation(s):"));
}

#[test]
fn config_path_and_show() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_flowlog(&["config", "path"], home.path());
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with(".config/flowlog/config.toml"));

    let (stdout, _, code) = run_flowlog(&["config", "show"], home.path());
    assert_eq!(code, 0);
    assert!(stdout.contains("[logging]"));
    assert!(stdout.contains("[rotation]"));
}

#[test]
fn invalid_config_is_rejected() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("flowlog");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[writer]\nbatch_size = 0\n").unwrap();

    let (_, stderr, code) = run_flowlog(&["config", "show"], home.path());
    assert_ne!(code, 0);
    assert!(stderr.contains("writer.batch_size must be greater than zero"));
}

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_flowlog(&["completions", "bash"], home.path());
    assert_eq!(code, 0);
    assert!(stdout.contains("flowlog"));
}
