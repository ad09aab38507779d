//! Parsers for perf-test tool output.
//!
//! Both tools print free-form text whose layout changes between Kafka
//! releases, so parsing never fails: whatever cannot be read is left out of
//! the returned [`MetricSet`].

use crate::model::{MetricSet, TestMode};
use regex::Regex;
use std::sync::LazyLock;

/// `<n> records sent, <f> records/sec (<f> MB/sec), <f> ms avg latency, <f> ms max latency`
static PRODUCER_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+)\s+records sent,\s+([\d.]+)\s+records/sec\s+\(([\d.]+)\s+MB/sec\),\s+([\d.]+)\s+ms avg latency,\s+([\d.]+)\s+ms max latency",
    )
    .expect("producer summary regex")
});

/// First column of the consumer CSV header.
const CONSUMER_HEADER_PREFIX: &str = "start.time";
/// Columns needed for the throughput fields.
const CONSUMER_MIN_FIELDS: usize = 6;
/// Columns needed for the rebalance/fetch timings.
const CONSUMER_TIMING_FIELDS: usize = 10;

/// Parse output for the given mode.
#[must_use]
pub fn parse_output(mode: TestMode, text: &str) -> MetricSet {
    match mode {
        TestMode::Producer => parse_producer_output(text),
        TestMode::Consumer => parse_consumer_output(text),
    }
}

/// Parse `kafka-producer-perf-test` output.
///
/// Uses the first line in the text matching the summary pattern. No match
/// yields an empty set.
#[must_use]
pub fn parse_producer_output(text: &str) -> MetricSet {
    let Some(caps) = PRODUCER_SUMMARY.captures(text) else {
        return MetricSet::default();
    };
    let group = |idx: usize| caps.get(idx).and_then(|m| to_metric(m.as_str()));

    MetricSet {
        records_sent: group(1),
        records_per_sec: group(2),
        throughput_mb_sec: group(3),
        avg_latency_ms: group(4),
        max_latency_ms: group(5),
        ..MetricSet::default()
    }
}

/// Parse `kafka-consumer-perf-test` output.
///
/// The summary row is the last non-blank, non-header line of the output.
/// Only that line is considered, even if it turns out to be unreadable.
#[must_use]
pub fn parse_consumer_output(text: &str) -> MetricSet {
    let candidate = text.lines().rev().find(|line| {
        !line.trim().is_empty() && !line.trim_start().starts_with(CONSUMER_HEADER_PREFIX)
    });
    let Some(line) = candidate else {
        return MetricSet::default();
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < CONSUMER_MIN_FIELDS {
        return MetricSet::default();
    }
    let field = |idx: usize| fields.get(idx).and_then(|value| to_metric(value));

    let mut metrics = MetricSet {
        data_consumed_mb: field(2),
        throughput_mb_sec: field(3),
        messages_consumed: field(4),
        records_per_sec: field(5),
        ..MetricSet::default()
    };
    if fields.len() >= CONSUMER_TIMING_FIELDS {
        metrics.rebalance_time_ms = field(6);
        metrics.fetch_time_ms = field(7);
    }
    metrics
}

fn to_metric(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}
