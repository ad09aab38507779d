//! Core data types for `kafka_bench`.
//!
//! - `TestMode` - producer or consumer benchmark
//! - `Acks` - producer acknowledgement level
//! - `TestConfig` - one validated benchmark invocation
//! - `RunStatus` - terminal outcome of one invocation
//! - `MetricSet` - numbers parsed from tool output
//! - `RunOutcome` - config + status + metrics for one invocation

use crate::error::BenchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which perf-test tool a config drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMode {
    Producer,
    Consumer,
}

impl TestMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestMode {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "producer" | "produce" => Ok(Self::Producer),
            "consumer" | "consume" => Ok(Self::Consumer),
            other => Err(BenchError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Producer acknowledgement level (`acks=` producer property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Acks {
    /// Fire and forget.
    #[serde(rename = "0")]
    None,
    /// Partition leader only.
    #[default]
    #[serde(rename = "1")]
    Leader,
    /// Full in-sync replica set.
    #[serde(rename = "all")]
    All,
}

impl Acks {
    /// Value passed to the producer tool.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Leader => "1",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Acks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Acks {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "none" => Ok(Self::None),
            "1" | "leader" => Ok(Self::Leader),
            "all" | "-1" => Ok(Self::All),
            other => Err(BenchError::InvalidAcks {
                value: other.to_string(),
            }),
        }
    }
}

/// One benchmark invocation, validated at construction.
///
/// Producer-only fields (`record_size`, `acks`) are `None` for consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    pub test_name: String,
    #[serde(rename = "test_type")]
    pub mode: TestMode,
    pub topic: String,
    #[serde(rename = "num_records")]
    pub record_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acks: Option<Acks>,
}

impl TestConfig {
    /// Build a producer config named `<topic>-producer`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty topic or a zero count/size.
    pub fn producer(
        topic: impl Into<String>,
        record_count: u64,
        record_size: u64,
        acks: Acks,
    ) -> Result<Self, BenchError> {
        let topic = validate_topic(topic.into())?;
        validate_positive("record_count", record_count)?;
        validate_positive("record_size", record_size)?;

        Ok(Self {
            test_name: default_test_name(&topic, TestMode::Producer),
            mode: TestMode::Producer,
            topic,
            record_count,
            record_size: Some(record_size),
            acks: Some(acks),
        })
    }

    /// Build a consumer config named `<topic>-consumer`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty topic or a zero message count.
    pub fn consumer(topic: impl Into<String>, messages: u64) -> Result<Self, BenchError> {
        let topic = validate_topic(topic.into())?;
        validate_positive("record_count", messages)?;

        Ok(Self {
            test_name: default_test_name(&topic, TestMode::Consumer),
            mode: TestMode::Consumer,
            topic,
            record_count: messages,
            record_size: None,
            acks: None,
        })
    }

    /// Replace the default test name. Blank names keep the default.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.test_name = name;
        }
        self
    }
}

fn default_test_name(topic: &str, mode: TestMode) -> String {
    format!("{topic}-{mode}")
}

fn validate_topic(topic: String) -> Result<String, BenchError> {
    if topic.trim().is_empty() {
        return Err(BenchError::validation("topic", "cannot be empty"));
    }
    Ok(topic)
}

fn validate_positive(field: &str, value: u64) -> Result<(), BenchError> {
    if value == 0 {
        return Err(BenchError::validation(field, "must be positive"));
    }
    Ok(())
}

/// Terminal status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Exit code 0.
    Success,
    /// Non-zero exit; stderr kept as the diagnostic.
    Failed,
    /// Wall-clock ceiling exceeded; process group killed.
    Timeout,
    /// The process could not be started or waited on.
    Error,
}

impl RunStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metrics parsed from tool output.
///
/// Every field is optional: whatever the tool did not print stays `None`
/// and is omitted from JSON. Values are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    // Producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_sent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_latency_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latency_ms: Option<f64>,

    // Shared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_per_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput_mb_sec: Option<f64>,

    // Consumer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_consumed_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages_consumed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalance_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_time_ms: Option<f64>,
}

impl MetricSet {
    /// True when the parser found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of one invocation.
///
/// `metrics` is present exactly when `status` is `Success`; the constructors
/// are the only way to build one outside deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    #[serde(flatten)]
    pub config: TestConfig,
    pub status: RunStatus,
    #[serde(rename = "elapsed_time")]
    pub elapsed_seconds: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunOutcome {
    #[must_use]
    pub fn success(
        config: TestConfig,
        metrics: MetricSet,
        elapsed_seconds: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            status: RunStatus::Success,
            elapsed_seconds,
            timestamp,
            metrics: Some(metrics),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(
        config: TestConfig,
        stderr: String,
        elapsed_seconds: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            status: RunStatus::Failed,
            elapsed_seconds,
            timestamp,
            metrics: None,
            error: Some(stderr),
        }
    }

    #[must_use]
    pub fn timed_out(config: TestConfig, elapsed_seconds: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            config,
            status: RunStatus::Timeout,
            elapsed_seconds,
            timestamp,
            metrics: None,
            error: None,
        }
    }

    #[must_use]
    pub fn errored(
        config: TestConfig,
        message: String,
        elapsed_seconds: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            status: RunStatus::Error,
            elapsed_seconds,
            timestamp,
            metrics: None,
            error: Some(message),
        }
    }

    #[must_use]
    pub fn mode(&self) -> TestMode {
        self.config.mode
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.config.test_name
    }

    /// Metrics of a successful run, or `None`.
    #[must_use]
    pub fn success_metrics(&self) -> Option<&MetricSet> {
        if self.status.is_success() {
            self.metrics.as_ref()
        } else {
            None
        }
    }
}
