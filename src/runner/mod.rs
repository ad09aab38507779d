//! Test Runner: one perf-test invocation per [`TestConfig`].
//!
//! The runner turns a config into a command line, executes it through a
//! [`CommandExecutor`] under a wall-clock ceiling, parses stdout on success,
//! and returns exactly one [`RunOutcome`]. Nothing here returns an error:
//! every failure mode is a [`RunStatus`](crate::model::RunStatus).

mod process;

pub use process::{CommandExecutor, ProcessExecutor, ProcessOutput};

use crate::model::{RunOutcome, TestConfig, TestMode};
use crate::parse;
use chrono::Utc;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Per-invocation ceiling used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Producer tool name.
pub const DEFAULT_PRODUCER_COMMAND: &str = "kafka-producer-perf-test.sh";
/// Consumer tool name.
pub const DEFAULT_CONSUMER_COMMAND: &str = "kafka-consumer-perf-test.sh";

/// Resolves which executable serves each mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLocator {
    bin_dir: Option<PathBuf>,
    producer_command: String,
    consumer_command: String,
}

impl Default for BinaryLocator {
    fn default() -> Self {
        Self {
            bin_dir: None,
            producer_command: DEFAULT_PRODUCER_COMMAND.to_string(),
            consumer_command: DEFAULT_CONSUMER_COMMAND.to_string(),
        }
    }
}

impl BinaryLocator {
    /// Look tools up in `bin_dir`, or on `PATH` when `None`.
    #[must_use]
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.filter(|dir| !dir.as_os_str().is_empty()),
            ..Self::default()
        }
    }

    /// Override the tool names.
    #[must_use]
    pub fn with_commands(mut self, producer: impl Into<String>, consumer: impl Into<String>) -> Self {
        self.producer_command = producer.into();
        self.consumer_command = consumer.into();
        self
    }

    /// Path to invoke for `mode`.
    #[must_use]
    pub fn resolve(&self, mode: TestMode) -> PathBuf {
        let command = match mode {
            TestMode::Producer => &self.producer_command,
            TestMode::Consumer => &self.consumer_command,
        };
        match &self.bin_dir {
            Some(dir) => dir.join(command),
            None => PathBuf::from(command),
        }
    }
}

/// Build the tool arguments for `config`.
///
/// Producers get every bootstrap server and unlimited throughput; consumers
/// only get the first server of the comma-separated list.
#[must_use]
pub fn build_args(config: &TestConfig, bootstrap_servers: &str) -> Vec<String> {
    match config.mode {
        TestMode::Producer => {
            let record_size = config.record_size.unwrap_or_default();
            let acks = config.acks.unwrap_or_default();
            vec![
                "--topic".to_string(),
                config.topic.clone(),
                "--num-records".to_string(),
                config.record_count.to_string(),
                "--record-size".to_string(),
                record_size.to_string(),
                "--throughput".to_string(),
                "-1".to_string(),
                "--producer-props".to_string(),
                format!("bootstrap.servers={bootstrap_servers}"),
                format!("acks={acks}"),
            ]
        }
        TestMode::Consumer => vec![
            "--bootstrap-server".to_string(),
            first_bootstrap_server(bootstrap_servers).to_string(),
            "--topic".to_string(),
            config.topic.clone(),
            "--messages".to_string(),
            config.record_count.to_string(),
            "--show-detailed-stats".to_string(),
        ],
    }
}

/// First entry of a comma-separated `host:port` list.
#[must_use]
pub fn first_bootstrap_server(bootstrap_servers: &str) -> &str {
    bootstrap_servers.split(',').next().unwrap_or_default().trim()
}

/// Executes single benchmark invocations.
pub struct Runner<E = ProcessExecutor> {
    bootstrap_servers: String,
    locator: BinaryLocator,
    executor: E,
    timeout: Duration,
}

impl Runner<ProcessExecutor> {
    /// Runner backed by real child processes.
    #[must_use]
    pub fn new(bootstrap_servers: impl Into<String>, locator: BinaryLocator) -> Self {
        Self::with_executor(bootstrap_servers, locator, ProcessExecutor)
    }
}

impl<E: CommandExecutor> Runner<E> {
    #[must_use]
    pub fn with_executor(
        bootstrap_servers: impl Into<String>,
        locator: BinaryLocator,
        executor: E,
    ) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            locator,
            executor,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn bootstrap_servers(&self) -> &str {
        &self.bootstrap_servers
    }

    /// Run one benchmark and record how it went.
    pub fn run_test(&self, config: &TestConfig) -> RunOutcome {
        log_banner(config);

        let program = self.locator.resolve(config.mode);
        let args = build_args(config, &self.bootstrap_servers);

        let start = Instant::now();
        let result = self.executor.execute(&program, &args, self.timeout);
        let elapsed = start.elapsed().as_secs_f64();
        let timestamp = Utc::now();

        match result {
            Ok(ProcessOutput::Exited {
                code: Some(0),
                stdout,
                ..
            }) => {
                let metrics = parse::parse_output(config.mode, &stdout);
                if metrics.is_empty() {
                    warn!(test = %config.test_name, "Test succeeded but no metrics were found in its output");
                }
                info!(
                    test = %config.test_name,
                    throughput_mb_sec = metrics.throughput_mb_sec.unwrap_or_default(),
                    records_per_sec = metrics.records_per_sec.unwrap_or_default(),
                    avg_latency_ms = ?metrics.avg_latency_ms,
                    elapsed_secs = elapsed,
                    "✓ Test completed successfully"
                );
                RunOutcome::success(config.clone(), metrics, elapsed, timestamp)
            }
            Ok(ProcessOutput::Exited { code, stderr, .. }) => {
                warn!(test = %config.test_name, exit_code = ?code, stderr = %stderr.trim(), "✗ Test failed");
                RunOutcome::failed(config.clone(), stderr, elapsed, timestamp)
            }
            Ok(ProcessOutput::TimedOut) => {
                warn!(
                    test = %config.test_name,
                    timeout_secs = self.timeout.as_secs(),
                    "✗ Test timed out"
                );
                RunOutcome::timed_out(config.clone(), elapsed, timestamp)
            }
            Err(e) => {
                warn!(test = %config.test_name, program = %program.display(), error = %e, "✗ Test error");
                let message = format!("failed to run {}: {e}", program.display());
                RunOutcome::errored(config.clone(), message, elapsed, timestamp)
            }
        }
    }
}

fn log_banner(config: &TestConfig) {
    match config.mode {
        TestMode::Producer => info!(
            test = %config.test_name,
            topic = %config.topic,
            records = config.record_count,
            record_size = config.record_size.unwrap_or_default(),
            acks = %config.acks.unwrap_or_default(),
            "Running PRODUCER test"
        ),
        TestMode::Consumer => info!(
            test = %config.test_name,
            topic = %config.topic,
            messages = config.record_count,
            "Running CONSUMER test"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Acks, RunStatus};
    use std::cell::RefCell;
    use std::io;
    use std::path::Path;

    const SERVERS: &str = "broker1:9092,broker2:9092,broker3:9092";

    /// Replays canned results and records what it was asked to run.
    struct Scripted {
        result: RefCell<Option<io::Result<ProcessOutput>>>,
        calls: RefCell<Vec<(PathBuf, Vec<String>, Duration)>>,
    }

    impl Scripted {
        fn new(result: io::Result<ProcessOutput>) -> Self {
            Self {
                result: RefCell::new(Some(result)),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandExecutor for &Scripted {
        fn execute(
            &self,
            program: &Path,
            args: &[String],
            timeout: Duration,
        ) -> io::Result<ProcessOutput> {
            self.calls
                .borrow_mut()
                .push((program.to_path_buf(), args.to_vec(), timeout));
            self.result.borrow_mut().take().expect("single call")
        }
    }

    fn producer() -> TestConfig {
        TestConfig::producer("p3-rf3", 1000, 512, Acks::All)
            .unwrap()
            .with_name("3P-RF3 Producer")
    }

    fn consumer() -> TestConfig {
        TestConfig::consumer("p3-rf3", 1000).unwrap()
    }

    #[test]
    fn producer_args() {
        let args = build_args(&producer(), SERVERS);
        assert_eq!(
            args,
            vec![
                "--topic",
                "p3-rf3",
                "--num-records",
                "1000",
                "--record-size",
                "512",
                "--throughput",
                "-1",
                "--producer-props",
                "bootstrap.servers=broker1:9092,broker2:9092,broker3:9092",
                "acks=all",
            ]
        );
    }

    #[test]
    fn consumer_args_use_first_server() {
        let args = build_args(&consumer(), SERVERS);
        assert_eq!(
            args,
            vec![
                "--bootstrap-server",
                "broker1:9092",
                "--topic",
                "p3-rf3",
                "--messages",
                "1000",
                "--show-detailed-stats",
            ]
        );
    }

    #[test]
    fn locator_joins_bin_dir() {
        let locator = BinaryLocator::new(Some(PathBuf::from("/opt/kafka/bin")));
        assert_eq!(
            locator.resolve(TestMode::Producer),
            PathBuf::from("/opt/kafka/bin/kafka-producer-perf-test.sh")
        );
        let bare = BinaryLocator::new(Some(PathBuf::new()));
        assert_eq!(
            bare.resolve(TestMode::Consumer),
            PathBuf::from("kafka-consumer-perf-test.sh")
        );
        let custom = BinaryLocator::default().with_commands("kafka-producer-perf-test", "cons");
        assert_eq!(custom.resolve(TestMode::Consumer), PathBuf::from("cons"));
    }

    #[test]
    fn success_parses_stdout() {
        let exec = Scripted::new(Ok(ProcessOutput::Exited {
            code: Some(0),
            stdout: "1000 records sent, 500.0 records/sec (0.49 MB/sec), 3.10 ms avg latency, 40.00 ms max latency.\n".to_string(),
            stderr: String::new(),
        }));
        let runner = Runner::with_executor(SERVERS, BinaryLocator::default(), &exec)
            .with_timeout(Duration::from_secs(7));

        let outcome = runner.run_test(&producer());
        assert_eq!(outcome.status, RunStatus::Success);
        let metrics = outcome.metrics.expect("metrics");
        assert_eq!(metrics.throughput_mb_sec, Some(0.49));
        assert_eq!(metrics.avg_latency_ms, Some(3.10));
        assert_eq!(outcome.config, producer());
        assert!(outcome.error.is_none());

        let calls = exec.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from(DEFAULT_PRODUCER_COMMAND));
        assert_eq!(calls[0].2, Duration::from_secs(7));
    }

    #[test]
    fn success_without_metrics_still_success() {
        let exec = Scripted::new(Ok(ProcessOutput::Exited {
            code: Some(0),
            stdout: "nothing useful".to_string(),
            stderr: String::new(),
        }));
        let runner = Runner::with_executor(SERVERS, BinaryLocator::default(), &exec);
        let outcome = runner.run_test(&consumer());
        assert_eq!(outcome.status, RunStatus::Success);
        assert!(outcome.metrics.is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn nonzero_exit_keeps_stderr() {
        let exec = Scripted::new(Ok(ProcessOutput::Exited {
            code: Some(1),
            stdout: "partial".to_string(),
            stderr: "TimeoutException: topic not present".to_string(),
        }));
        let runner = Runner::with_executor(SERVERS, BinaryLocator::default(), &exec);
        let outcome = runner.run_test(&producer());
        assert_eq!(outcome.status, RunStatus::Failed);
        assert!(outcome.metrics.is_none());
        assert_eq!(
            outcome.error.as_deref(),
            Some("TimeoutException: topic not present")
        );
    }

    #[test]
    fn signal_death_is_failure() {
        let exec = Scripted::new(Ok(ProcessOutput::Exited {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        }));
        let runner = Runner::with_executor(SERVERS, BinaryLocator::default(), &exec);
        assert_eq!(runner.run_test(&producer()).status, RunStatus::Failed);
    }

    #[test]
    fn timeout_has_no_diagnostic() {
        let exec = Scripted::new(Ok(ProcessOutput::TimedOut));
        let runner = Runner::with_executor(SERVERS, BinaryLocator::default(), &exec);
        let outcome = runner.run_test(&consumer());
        assert_eq!(outcome.status, RunStatus::Timeout);
        assert!(outcome.metrics.is_none());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn spawn_failure_is_error() {
        let exec = Scripted::new(Err(io::Error::new(io::ErrorKind::NotFound, "no such file")));
        let locator = BinaryLocator::new(Some(PathBuf::from("/missing")));
        let runner = Runner::with_executor(SERVERS, locator, &exec);
        let outcome = runner.run_test(&consumer());
        assert_eq!(outcome.status, RunStatus::Error);
        let message = outcome.error.expect("diagnostic");
        assert!(message.contains("/missing/kafka-consumer-perf-test.sh"));
        assert!(message.contains("no such file"));
    }
}
