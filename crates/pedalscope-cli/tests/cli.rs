use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::{Value, json};
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pedalscope"))
}

const SAMPLE_PAYLOAD: &str = "020106210007e803b00496002800021e19800c";

fn write_sample_capture(dir: &TempDir) -> std::path::PathBuf {
    let records = json!([
        {
            "ts": 100.0,
            "address": "C4:32:96:00:00:01",
            "rssi": -62,
            "data": SAMPLE_PAYLOAD,
        },
        {
            "ts": 101.0,
            "address": "C4:32:96:00:00:01",
            "rssi": -64,
            "data": SAMPLE_PAYLOAD,
        }
    ]);
    let path = dir.path().join("scan.json");
    std::fs::write(&path, records.to_string()).expect("write capture");
    path
}

#[test]
fn help_supports_analyse_and_analyze() {
    cmd()
        .arg("capture")
        .arg("analyse")
        .arg("--help")
        .assert()
        .success();
    cmd()
        .arg("capture")
        .arg("analyze")
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn decode_prints_telemetry_json() {
    let assert = cmd()
        .arg("decode")
        .arg(SAMPLE_PAYLOAD)
        .arg("--address")
        .arg("C4:32:96:00:00:01")
        .arg("--rssi=-70")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["build_major"], json!(6));
    assert_eq!(value["build_minor"], json!(21));
    assert_eq!(value["cadence_rpm"], json!(100.0));
    assert_eq!(value["power_watts"], json!(150));
    assert_eq!(value["gear"], json!(12));
    assert_eq!(value["source_address"], json!("C4:32:96:00:00:01"));
    assert_eq!(value["rssi"], json!(-70));
}

#[test]
fn decode_rejects_short_payload_with_hint() {
    cmd()
        .arg("decode")
        .arg("0601")
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn decode_lenient_zero_fills_short_payload() {
    let assert = cmd()
        .arg("decode")
        .arg("06210000")
        .arg("--lenient")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["power_watts"], json!(0));
    assert_eq!(value["build_major"], json!(0));
}

#[test]
fn decode_rejects_invalid_hex() {
    cmd()
        .arg("decode")
        .arg("not-hex")
        .assert()
        .failure()
        .stderr(contains("invalid hex payload"));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.json");
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyze")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn analyse_writes_report_file() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let text = std::fs::read_to_string(&report).expect("read report");
    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["report_version"], json!(1));
    assert_eq!(value["tool"]["name"], json!("pedalscope"));
    assert_eq!(value["capture_summary"]["observations_total"], json!(2));
    assert_eq!(value["devices"][0]["frames_count"], json!(2));
    assert_eq!(value["devices"][0]["last"]["cadence_rpm"], json!(100.0));
}

#[test]
fn analyse_stdout_outputs_json() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample_capture(&temp);

    let assert = cmd()
        .arg("capture")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let _: Value = serde_json::from_str(&stdout).expect("valid json");
}

#[test]
fn analyse_stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn analyse_pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn analyse_quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn analyse_strict_fails_on_rejects() {
    let temp = TempDir::new().expect("tempdir");
    let records = json!([
        { "address": "C4:32:96:00:00:09", "data": "06" }
    ]);
    let input = temp.path().join("bad.json");
    std::fs::write(&input, records.to_string()).expect("write capture");
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--strict")
        .arg("--list-rejects")
        .assert()
        .failure()
        .stderr(contains("PS-LENGTH-RANGE").and(contains("rejected observations present")));
}

#[test]
fn synth_then_analyse_round_trip() {
    let temp = TempDir::new().expect("tempdir");
    let capture = temp.path().join("synth.json");
    let report = temp.path().join("report.json");

    cmd()
        .arg("synth")
        .arg("--bikes")
        .arg("3")
        .arg("--frames")
        .arg("5")
        .arg("-o")
        .arg(&capture)
        .assert()
        .success();

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&capture)
        .arg("-o")
        .arg(&report)
        .arg("--strict")
        .assert()
        .success();

    let text = std::fs::read_to_string(&report).expect("read report");
    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["capture_summary"]["observations_total"], json!(15));
    assert_eq!(value["devices"].as_array().expect("devices").len(), 3);
    assert!(value["rejects"].as_array().expect("rejects").is_empty());
}

#[test]
fn synth_requires_positive_counts() {
    cmd()
        .arg("synth")
        .arg("--bikes")
        .arg("0")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("nothing to generate"));
}
