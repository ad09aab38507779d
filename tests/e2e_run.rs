//! E2E tests for `kbench run` against stand-in perf-test scripts.
//!
//! Test coverage:
//! - Full producer + consumer suite writes results and report
//! - Failures, timeouts and missing tools are recorded, not fatal
//! - `--skip-consumer` and `--json` output
//! - Runs with nothing successful write results but no report

#![cfg(unix)]

mod common;

use common::cli::{KbWorkspace, extract_json_payload, run_kbench};
use common::fake_kafka::FakeKafka;
use serde_json::Value;
use std::fs;

fn run_args(workspace: &KbWorkspace, kafka: &FakeKafka, extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--kafka-bin".to_string(),
        kafka.bin_arg(),
        "--output-dir".to_string(),
        workspace.out_dir.display().to_string(),
        "--cooldown".to_string(),
        "0".to_string(),
        "--num-records".to_string(),
        "1000".to_string(),
    ];
    args.extend(extra.iter().map(ToString::to_string));
    args
}

fn load_results(workspace: &KbWorkspace) -> Vec<Value> {
    let files = workspace.outputs("benchmark_results_");
    assert_eq!(files.len(), 1, "expected one results file: {files:?}");
    let text = fs::read_to_string(&files[0]).expect("read results");
    let value: Value = serde_json::from_str(&text).expect("results json");
    value.as_array().expect("results array").clone()
}

#[test]
fn e2e_run_full_suite_writes_results_and_report() {
    let _log = common::test_log("e2e_run_full_suite_writes_results_and_report");
    let workspace = KbWorkspace::new();
    let kafka = FakeKafka::install(&workspace.root);

    let args = run_args(
        &workspace,
        &kafka,
        &["--topic", "p1-rf1:1", "--topic", "p3-rf3:all"],
    );
    let run = run_kbench(&workspace, &args, "run_full");
    assert!(run.status.success(), "run failed: {}", run.stderr);

    assert!(run.stdout.contains("Kafka Benchmark Summary"));
    assert!(run.stdout.contains("Successful runs: 4 of 4"));
    assert!(run.stdout.contains("Producer Performance by Topic"));
    assert!(run.stdout.contains("Consumer Performance by Topic"));
    assert!(run.stdout.contains("Results saved to: "));
    assert!(run.stdout.contains("HTML report generated: "));

    let results = load_results(&workspace);
    assert_eq!(results.len(), 4);
    let names: Vec<&str> = results
        .iter()
        .map(|r| r["test_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "1P-RF1 Producer",
            "3P-RF3 Producer",
            "1P-RF1 Consumer",
            "3P-RF3 Consumer"
        ]
    );
    assert_eq!(results[0]["test_type"], "producer");
    assert_eq!(results[0]["acks"], "1");
    assert_eq!(results[1]["acks"], "all");
    assert_eq!(results[0]["status"], "success");
    assert_eq!(results[0]["metrics"]["records_sent"], 1000.0);
    assert_eq!(results[0]["metrics"]["throughput_mb_sec"], 0.5);
    assert_eq!(results[2]["test_type"], "consumer");
    assert_eq!(results[2]["metrics"]["messages_consumed"], 1000.0);
    assert_eq!(results[2]["metrics"]["fetch_time_ms"], 700.0);
    assert!(results[2].get("acks").is_none());

    let reports = workspace.outputs("benchmark_report_");
    assert_eq!(reports.len(), 1);
    let html = fs::read_to_string(&reports[0]).expect("read report");
    assert!(html.contains("Kafka Performance Benchmark Report"));
    assert!(html.contains("Plotly.newPlot('charts'"));

    // Report and results share the run stamp.
    let results_name = workspace.outputs("benchmark_results_")[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    let report_name = reports[0].file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(
        results_name.trim_start_matches("benchmark_results_").trim_end_matches(".json"),
        report_name.trim_start_matches("benchmark_report_").trim_end_matches(".html"),
    );
}

#[test]
fn e2e_run_records_failures_and_continues() {
    let _log = common::test_log("e2e_run_records_failures_and_continues");
    let workspace = KbWorkspace::new();
    let kafka = FakeKafka::install(&workspace.root);

    let args = run_args(
        &workspace,
        &kafka,
        &["--topic", "broken", "--topic", "p1-rf1", "--skip-consumer"],
    );
    let run = run_kbench(&workspace, &args, "run_failures");
    assert!(run.status.success(), "run failed: {}", run.stderr);

    let results = load_results(&workspace);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["status"], "failed");
    assert!(
        results[0]["error"]
            .as_str()
            .unwrap()
            .contains("TimeoutException")
    );
    assert!(results[0].get("metrics").is_none());
    assert_eq!(results[1]["status"], "success");
    assert_eq!(workspace.outputs("benchmark_report_").len(), 1);
}

#[test]
fn e2e_run_timeout_kills_slow_test() {
    let _log = common::test_log("e2e_run_timeout_kills_slow_test");
    let workspace = KbWorkspace::new();
    let kafka = FakeKafka::install(&workspace.root);

    let args = run_args(
        &workspace,
        &kafka,
        &["--topic", "slow", "--skip-consumer", "--timeout", "1"],
    );
    let run = run_kbench(&workspace, &args, "run_timeout");
    assert!(run.status.success(), "run failed: {}", run.stderr);
    assert!(
        run.duration.as_secs() < 20,
        "timeout did not stop the test: {:?}",
        run.duration
    );

    let results = load_results(&workspace);
    assert_eq!(results[0]["status"], "timeout");
    assert!(results[0].get("metrics").is_none());
    assert!(run.stdout.contains("No successful test results to generate report"));
    assert!(workspace.outputs("benchmark_report_").is_empty());
}

#[test]
fn e2e_run_missing_tool_is_an_error_outcome() {
    let _log = common::test_log("e2e_run_missing_tool_is_an_error_outcome");
    let workspace = KbWorkspace::new();
    let empty_bin = workspace.root.join("no-tools");
    fs::create_dir_all(&empty_bin).unwrap();

    let args = vec![
        "run".to_string(),
        "--kafka-bin".to_string(),
        empty_bin.display().to_string(),
        "--output-dir".to_string(),
        workspace.out_dir.display().to_string(),
        "--cooldown".to_string(),
        "0".to_string(),
        "--topic".to_string(),
        "p1-rf1".to_string(),
    ];
    let run = run_kbench(&workspace, &args, "run_missing_tool");
    assert!(run.status.success(), "run failed: {}", run.stderr);

    let results = load_results(&workspace);
    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result["status"], "error");
        assert!(result["error"].as_str().unwrap().contains("failed to run"));
    }
}

#[test]
fn e2e_run_json_output() {
    let _log = common::test_log("e2e_run_json_output");
    let workspace = KbWorkspace::new();
    let kafka = FakeKafka::install(&workspace.root);

    let args = run_args(
        &workspace,
        &kafka,
        &["--topic", "p1-rf1", "--topic", "broken", "--json"],
    );
    let run = run_kbench(&workspace, &args, "run_json");
    assert!(run.status.success(), "run failed: {}", run.stderr);

    let payload: Value =
        serde_json::from_str(&extract_json_payload(&run.stdout)).expect("json output");
    assert_eq!(payload["summary"]["total"], 4);
    assert_eq!(payload["summary"]["succeeded"], 2);
    assert_eq!(payload["summary"]["failed"], 2);
    assert!(
        payload["results_file"]
            .as_str()
            .unwrap()
            .contains("benchmark_results_")
    );
    assert!(
        payload["report_file"]
            .as_str()
            .unwrap()
            .contains("benchmark_report_")
    );
    assert_eq!(
        payload["report"]["callouts"]["best_configuration"],
        "1P-RF1 Producer"
    );
}

#[test]
fn e2e_run_quiet_prints_nothing() {
    let _log = common::test_log("e2e_run_quiet_prints_nothing");
    let workspace = KbWorkspace::new();
    let kafka = FakeKafka::install(&workspace.root);

    let args = run_args(&workspace, &kafka, &["--topic", "p1-rf1", "--quiet"]);
    let run = run_kbench(&workspace, &args, "run_quiet");
    assert!(run.status.success(), "run failed: {}", run.stderr);
    assert!(run.stdout.trim().is_empty(), "stdout: {}", run.stdout);
    assert_eq!(load_results(&workspace).len(), 2);
}
