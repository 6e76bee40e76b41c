//! CLI Integration Tests
//!
//! Runs the tablesplice binary with assert_cmd against workbooks generated
//! in a TempDir.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::write_report;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tablesplice() -> Command {
    let mut cmd = Command::cargo_bin("tablesplice").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("TABLESPLICE_CONFIG")
        .env_remove("TABLESPLICE_HEADER_KEYWORD")
        .env_remove("TABLESPLICE_FILENAME_PATTERN")
        .env_remove("TABLESPLICE_DATA_STRUCTURE");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND ARGUMENT VALIDATION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    tablesplice()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--show_headers"))
        .stdout(predicate::str::contains("--data_group"))
        .stdout(predicate::str::contains("WHERE SYNTAX"));
}

#[test]
fn test_cli_version() {
    tablesplice()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tablesplice"));
}

#[test]
fn test_cli_requires_input_or_base_path() {
    tablesplice()
        .args(["--data_group", "G", "--category", "C", "--output", "x.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_cli_input_and_base_path_conflict() {
    tablesplice()
        .args(["-i", "a.xlsx", "--base_report_path", "/tmp"])
        .assert()
        .failure();
}

#[test]
fn test_cli_output_required_without_show_headers() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn test_cli_output_requires_group_and_category() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .args(["--data_group", "G"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--category"));
    assert!(!dir.path().join("out.json").exists());
}

// ═══════════════════════════════════════════════════════════════════════════
// SHOW HEADERS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_show_headers() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .arg("--show_headers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available Headers:"))
        .stdout(predicate::str::contains("kind\nDOG\nSIZE"));
}

#[test]
fn test_cli_show_headers_wrong_marker() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--show_headers", "--header_keyword", "MISSING"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No 'MISSING' headers found"));
}

#[test]
fn test_cli_missing_input_file() {
    let dir = TempDir::new().unwrap();

    tablesplice()
        .arg("-i")
        .arg(dir.path().join("absent.xlsx"))
        .arg("--show_headers")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Failed to load sheet"));
}

// ═══════════════════════════════════════════════════════════════════════════
// EXTRACT AND MERGE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_extract_creates_json() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("data.json");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .args(["--select", "DOG,SIZE"])
        .args(["--where", r#"DOG == "DOG_t" and SIZE == 25"#])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""DOG": "DOG_t""#))
        .stdout(predicate::str::contains(r#""SIZE": 25"#));

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        doc,
        serde_json::json!({"DATA_GROUP_COLLECTION": {"G": {"C": [{"DOG": "DOG_t", "SIZE": 25}]}}})
    );
}

#[test]
fn test_cli_second_run_adds_sibling_category() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("data.json");

    for category in ["C1", "C2"] {
        tablesplice()
            .arg("-i")
            .arg(&input)
            .args(["--data_group", "G", "--category", category])
            .args(["--select", "DOG", "--start_table", "-1"])
            .arg("--output")
            .arg(&output)
            .assert()
            .success();
    }

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let group = &doc["DATA_GROUP_COLLECTION"]["G"];
    assert_eq!(group["C1"], serde_json::json!([{"DOG": "DOG_x"}]));
    assert_eq!(group["C2"], serde_json::json!([{"DOG": "DOG_x"}]));
}

#[test]
fn test_cli_yaml_output_prints_yaml() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("data.yaml");
    fs::write(&output, "---\nDATA_GROUP_COLLECTION: {}\n").unwrap();

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .args(["--where", "SIZE < 20", "--select", "DOG"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("- DOG: DOG_s"));

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("---\n"));
    assert!(text.contains("DOG_s"));
}

#[test]
fn test_cli_data_structure_override() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("data.json");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .args(["--data_structure", "MEASUREMENTS"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("\"MEASUREMENTS\""));
    assert!(!text.contains("DATA_GROUP_COLLECTION"));
}

#[test]
fn test_cli_config_file() {
    let dir = TempDir::new().unwrap();
    let report_dir = dir.path().join("G").join("C");
    fs::create_dir_all(&report_dir).unwrap();
    write_report(&report_dir, "C_run1_meas.xlsx");
    let config = dir.path().join("tablesplice.yaml");
    fs::write(
        &config,
        "filename_pattern: \"{data_group}/{category}/{category}_*_meas.xlsx\"\ndata_structure: ROOT\n",
    )
    .unwrap();
    let output = dir.path().join("data.json");

    tablesplice()
        .arg("--config")
        .arg(&config)
        .arg("--base_report_path")
        .arg(dir.path())
        .args(["--data_group", "G", "--category", "C"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["ROOT"]["G"]["C"].as_array().map(Vec::len), Some(4));
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_pattern_without_match() {
    let dir = TempDir::new().unwrap();

    tablesplice()
        .arg("--base_report_path")
        .arg(dir.path())
        .args(["--data_group", "G", "--category", "C"])
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No files found matching"));
}

#[test]
fn test_cli_bad_where_clause() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("data.json");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .args(["--where", "SIZE = 25"])
        .arg("--output")
        .arg(&output)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Invalid expression"));
    assert!(!output.exists());
}

#[test]
fn test_cli_unknown_select_column() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .args(["--select", "DOG,WEIGHT"])
        .arg("--output")
        .arg(dir.path().join("data.json"))
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Column 'WEIGHT' not found"));
}

#[test]
fn test_cli_csv_output_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("data.csv");
    fs::write(&output, "a,b\n1,2\n").unwrap();

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .arg("--output")
        .arg(&output)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Cannot update CSV files incrementally"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "a,b\n1,2\n");
}

#[test]
fn test_cli_unrecognized_output() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("notes.txt");
    fs::write(&output, "just some notes\n").unwrap();

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .arg("--output")
        .arg(&output)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Unknown file format"));
}

#[test]
fn test_cli_empty_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.xlsx");
    let output = dir.path().join("empty.json");
    fs::write(&output, "").unwrap();

    tablesplice()
        .arg("-i")
        .arg(&input)
        .args(["--data_group", "G", "--category", "C"])
        .arg("--output")
        .arg(&output)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("is empty or corrupted"));
}
