//! E2E tests for error output and exit codes.

mod common;

use common::cli::{KbWorkspace, run_kbench};
use serde_json::Value;
use std::fs;

fn error_envelope(stderr: &str) -> Value {
    let start = stderr.find("{\n").expect("json error on stderr");
    let end = stderr.rfind('}').expect("json end");
    serde_json::from_str(&stderr[start..=end]).expect("error json")
}

#[test]
fn e2e_report_missing_results_file() {
    let _log = common::test_log("e2e_report_missing_results_file");
    let workspace = KbWorkspace::new();

    let run = run_kbench(
        &workspace,
        ["report", "benchmark_results_20260301_101530.json", "--json"],
        "report_missing",
    );
    assert_eq!(run.status.code(), Some(6));
    let envelope = error_envelope(&run.stderr);
    assert_eq!(envelope["error"]["code"], "RESULTS_NOT_FOUND");
    assert_eq!(envelope["error"]["retryable"], false);
    assert!(envelope["error"]["hint"].as_str().unwrap().contains("kbench run"));
}

#[test]
fn e2e_report_malformed_results_file() {
    let _log = common::test_log("e2e_report_malformed_results_file");
    let workspace = KbWorkspace::new();
    fs::write(workspace.root.join("broken.json"), "{\"not\": \"a list\"}").unwrap();

    let run = run_kbench(&workspace, ["report", "broken.json", "--json"], "report_malformed");
    assert_eq!(run.status.code(), Some(6));
    assert_eq!(error_envelope(&run.stderr)["error"]["code"], "RESULTS_PARSE_ERROR");
}

#[test]
fn e2e_run_unusable_output_dir_runs_nothing() {
    let _log = common::test_log("e2e_run_unusable_output_dir_runs_nothing");
    let workspace = KbWorkspace::new();
    let blocker = workspace.root.join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let run = run_kbench(
        &workspace,
        [
            "run".to_string(),
            "--output-dir".to_string(),
            blocker.join("out").display().to_string(),
            "--kafka-bin".to_string(),
            workspace.root.join("no-such-bin").display().to_string(),
            "--json".to_string(),
        ],
        "run_bad_output",
    );
    assert_eq!(run.status.code(), Some(7));
    assert_eq!(
        error_envelope(&run.stderr)["error"]["code"],
        "OUTPUT_DIR_UNAVAILABLE"
    );
    assert!(!run.stderr.contains("Running PRODUCER test"));
}

#[test]
fn e2e_run_invalid_config_value() {
    let _log = common::test_log("e2e_run_invalid_config_value");
    let workspace = KbWorkspace::new();
    fs::write(workspace.root.join("kbench.yaml"), "num-records: lots\n").unwrap();

    let run = run_kbench(&workspace, ["run", "--json"], "run_bad_config");
    assert_eq!(run.status.code(), Some(7));
    let envelope = error_envelope(&run.stderr);
    assert_eq!(envelope["error"]["code"], "CONFIG_ERROR");
    assert!(
        envelope["error"]["message"]
            .as_str()
            .unwrap()
            .contains("num-records")
    );
}

#[test]
fn e2e_run_explicit_config_missing() {
    let _log = common::test_log("e2e_run_explicit_config_missing");
    let workspace = KbWorkspace::new();

    let run = run_kbench(&workspace, ["run", "--config", "absent.yaml"], "run_missing_config");
    assert_eq!(run.status.code(), Some(7));
    assert!(run.stderr.contains("absent.yaml"));
}

#[test]
fn e2e_run_rejects_bad_topic_flag() {
    let _log = common::test_log("e2e_run_rejects_bad_topic_flag");
    let workspace = KbWorkspace::new();

    let run = run_kbench(&workspace, ["run", "--topic", "p1-rf1:7"], "run_bad_topic");
    assert!(!run.status.success());
    assert!(run.stderr.contains("--topic"), "stderr: {}", run.stderr);
}

#[test]
fn e2e_unopenable_log_file_is_fatal() {
    let _log = common::test_log("e2e_unopenable_log_file_is_fatal");
    let workspace = KbWorkspace::new();
    let log_file = workspace.root.join("no-such-dir").join("kbench.log");

    let run = run_kbench(
        &workspace,
        [
            "parse".to_string(),
            "producer".to_string(),
            "missing.txt".to_string(),
            "--log-file".to_string(),
            log_file.display().to_string(),
            "--json".to_string(),
        ],
        "log_file_unopenable",
    );
    assert_eq!(run.status.code(), Some(1));
    let envelope = error_envelope(&run.stderr);
    assert_eq!(envelope["error"]["code"], "INTERNAL_ERROR");
    assert!(
        envelope["error"]["message"].as_str().unwrap().contains("no-such-dir"),
        "unexpected message: {envelope}"
    );
    assert!(envelope["error"]["hint"].as_str().unwrap().contains("--log-file"));
}
