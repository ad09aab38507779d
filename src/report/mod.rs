//! Aggregator and report builder.
//!
//! [`build_report`] reduces the successful outcomes of a run into a
//! [`Report`]: headline callouts, per-topic tables, insights and a chart
//! layout. The report is rendered as a standalone HTML page or as a terminal
//! summary.

pub mod aggregate;
pub mod chart;
mod html;
mod text;

pub use aggregate::{Callouts, Insight, TopicSummary};
pub use chart::ChartLayout;
pub use html::{render_html, write_html};
pub use text::render_text;

use crate::model::{RunOutcome, TestMode};
use serde::Serialize;
use tracing::{debug, info};

/// Everything needed to render a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub callouts: Callouts,
    pub producer_topics: Vec<TopicSummary>,
    pub consumer_topics: Vec<TopicSummary>,
    pub insights: Vec<Insight>,
    pub chart: ChartLayout,
    pub counts: RunCounts,
}

/// How many outcomes went into the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub total: usize,
    pub producer_successes: usize,
    pub consumer_successes: usize,
}

impl Report {
    #[must_use]
    pub fn has_producer(&self) -> bool {
        self.counts.producer_successes > 0
    }

    #[must_use]
    pub fn has_consumer(&self) -> bool {
        self.counts.consumer_successes > 0
    }

    /// Machine-readable summary (callouts and tables, no chart).
    #[must_use]
    pub fn summary_json(&self) -> serde_json::Value {
        serde_json::json!({
            "counts": self.counts,
            "callouts": self.callouts,
            "producer_topics": self.producer_topics,
            "consumer_topics": self.consumer_topics,
        })
    }
}

/// Aggregate `outcomes` into a report.
///
/// Returns `None` when no outcome succeeded.
#[must_use]
pub fn build_report(outcomes: &[RunOutcome]) -> Option<Report> {
    let (producers, consumers) = aggregate::partition(outcomes);
    let Some(callouts) = aggregate::callouts(&producers, &consumers) else {
        info!(outcomes = outcomes.len(), "No successful test results to generate report");
        return None;
    };

    let producer_topics = aggregate::summarize_topics(TestMode::Producer, &producers);
    let consumer_topics = aggregate::summarize_topics(TestMode::Consumer, &consumers);

    let chart = match (producers.is_empty(), consumers.is_empty()) {
        (false, false) => {
            chart::combined_layout(&producers, &consumers, &producer_topics, &consumer_topics)
        }
        (false, true) => chart::producer_layout(&producers),
        _ => chart::consumer_layout(&consumers, &consumer_topics),
    };

    debug!(
        producers = producers.len(),
        consumers = consumers.len(),
        best = %callouts.best_configuration,
        "Built report"
    );

    Some(Report {
        insights: aggregate::insights(!producers.is_empty(), !consumers.is_empty()),
        counts: RunCounts {
            total: outcomes.len(),
            producer_successes: producers.len(),
            consumer_successes: consumers.len(),
        },
        callouts,
        producer_topics,
        consumer_topics,
        chart,
    })
}
