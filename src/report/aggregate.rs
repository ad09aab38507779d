//! Per-topic statistics, headline numbers and insights.
//!
//! Everything here works on successful runs only; callers filter through
//! [`partition`] first.

use crate::model::{MetricSet, RunOutcome, TestMode};
use serde::Serialize;

/// Display order for the standard topic matrix. Other topics follow in the
/// order they were first seen.
pub const CANONICAL_TOPICS: [&str; 5] = ["p1-rf1", "p1-rf3", "p3-rf3", "p12-rf3", "p30-rf3"];

/// A successful run paired with its metrics.
#[derive(Debug, Clone, Copy)]
pub struct Sample<'a> {
    pub outcome: &'a RunOutcome,
    pub metrics: &'a MetricSet,
}

impl<'a> Sample<'a> {
    #[must_use]
    pub fn topic(&self) -> &'a str {
        self.outcome.topic()
    }

    #[must_use]
    pub fn test_name(&self) -> &'a str {
        self.outcome.test_name()
    }
}

/// Split successful outcomes into producer and consumer samples, keeping
/// input order within each.
#[must_use]
pub fn partition(outcomes: &[RunOutcome]) -> (Vec<Sample<'_>>, Vec<Sample<'_>>) {
    let mut producers = Vec::new();
    let mut consumers = Vec::new();
    for outcome in outcomes {
        let Some(metrics) = outcome.success_metrics() else {
            continue;
        };
        let sample = Sample { outcome, metrics };
        match outcome.mode() {
            TestMode::Producer => producers.push(sample),
            TestMode::Consumer => consumers.push(sample),
        }
    }
    (producers, consumers)
}

/// Topics present in `samples`, canonical ones first.
#[must_use]
pub fn ordered_topics<'a>(samples: &[Sample<'a>]) -> Vec<&'a str> {
    let mut topics: Vec<&'a str> = CANONICAL_TOPICS
        .iter()
        .copied()
        .filter(|canonical| samples.iter().any(|s| s.topic() == *canonical))
        .collect();

    for sample in samples {
        let topic = sample.topic();
        if !topics.contains(&topic) {
            topics.push(topic);
        }
    }
    topics
}

/// Arithmetic mean, `None` for an empty input.
#[must_use]
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean metrics for one topic within one mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    pub mode: TestMode,
    pub mean_throughput_mb_sec: Option<f64>,
    pub mean_records_per_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_avg_latency_ms: Option<f64>,
    pub runs: usize,
}

/// One row per topic, in display order.
///
/// Each mean covers the runs where that field was parsed. Latency is only
/// summarized for producers.
#[must_use]
pub fn summarize_topics(mode: TestMode, samples: &[Sample<'_>]) -> Vec<TopicSummary> {
    ordered_topics(samples)
        .into_iter()
        .map(|topic| {
            let runs: Vec<&MetricSet> = samples
                .iter()
                .filter(|s| s.topic() == topic)
                .map(|s| s.metrics)
                .collect();
            let latency = match mode {
                TestMode::Producer => mean(runs.iter().filter_map(|m| m.avg_latency_ms)),
                TestMode::Consumer => None,
            };
            TopicSummary {
                topic: topic.to_string(),
                mode,
                mean_throughput_mb_sec: mean(runs.iter().filter_map(|m| m.throughput_mb_sec)),
                mean_records_per_sec: mean(runs.iter().filter_map(|m| m.records_per_sec)),
                mean_avg_latency_ms: latency,
                runs: runs.len(),
            }
        })
        .collect()
}

/// Headline numbers shown above the tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Callouts {
    /// Subset the numbers were computed from.
    pub basis: TestMode,
    pub total_records: f64,
    pub mean_throughput_mb_sec: Option<f64>,
    pub peak_throughput_mb_sec: Option<f64>,
    pub best_configuration: String,
}

/// Run with the highest throughput; the earliest wins a tie.
///
/// Falls back to the first sample when no run reported throughput.
#[must_use]
pub fn best_run<'a>(samples: &[Sample<'a>]) -> Option<Sample<'a>> {
    let mut best: Option<(Sample<'a>, f64)> = None;
    for sample in samples {
        let Some(throughput) = sample.metrics.throughput_mb_sec else {
            continue;
        };
        if best.is_none_or(|(_, top)| throughput > top) {
            best = Some((*sample, throughput));
        }
    }
    best.map(|(s, _)| s).or_else(|| samples.first().copied())
}

/// Callouts for the producer subset when it has runs, else the consumer one.
#[must_use]
pub fn callouts(producers: &[Sample<'_>], consumers: &[Sample<'_>]) -> Option<Callouts> {
    let (basis, samples) = if producers.is_empty() {
        (TestMode::Consumer, consumers)
    } else {
        (TestMode::Producer, producers)
    };
    let best = best_run(samples)?;

    let total_records = samples
        .iter()
        .filter_map(|s| match basis {
            TestMode::Producer => s.metrics.records_sent,
            TestMode::Consumer => s.metrics.messages_consumed,
        })
        .sum();
    let throughputs = || samples.iter().filter_map(|s| s.metrics.throughput_mb_sec);

    Some(Callouts {
        basis,
        total_records,
        mean_throughput_mb_sec: mean(throughputs()),
        peak_throughput_mb_sec: throughputs().reduce(f64::max),
        best_configuration: best.test_name().to_string(),
    })
}

/// A short reading hint shown at the bottom of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub title: &'static str,
    pub detail: &'static str,
}

#[must_use]
pub fn insights(has_producer: bool, has_consumer: bool) -> Vec<Insight> {
    let mut out = Vec::new();
    if has_producer {
        out.push(Insight {
            title: "Replication Impact",
            detail: "Compare p1-rf1 vs p1-rf3 to see replication overhead",
        });
        out.push(Insight {
            title: "Partition Scaling",
            detail: "Higher partition counts improve throughput",
        });
    }
    if has_consumer {
        out.push(Insight {
            title: "Consumer Performance",
            detail: "Consumers typically achieve higher throughput",
        });
    }
    if has_producer && has_consumer {
        out.push(Insight {
            title: "End-to-End",
            detail: "Compare producer and consumer for the same topic",
        });
    }
    out
}
