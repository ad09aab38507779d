//! Plain-text summary printed after a run.

use super::{Report, TopicSummary};
use crate::format::{display_width, format_count, format_optional, pad_left, pad_right};
use crate::model::TestMode;

const LABEL_WIDTH: usize = 22;
const GAP: &str = "  ";

#[must_use]
pub fn render_text(report: &Report) -> String {
    let callouts = &report.callouts;
    let mut out = String::new();

    out.push_str("Kafka Benchmark Summary\n");
    out.push_str("=======================\n");
    out.push_str(&format!(
        "Successful runs: {} of {}\n\n",
        report.counts.producer_successes + report.counts.consumer_successes,
        report.counts.total
    ));

    let line = |label: &str, value: String| format!("{}{value}\n", pad_right(label, LABEL_WIDTH));
    out.push_str(&line("Total Records Tested:", format_count(callouts.total_records)));
    out.push_str(&line(
        "Average Throughput:",
        format!("{} MB/sec", format_optional(callouts.mean_throughput_mb_sec)),
    ));
    out.push_str(&line(
        "Peak Throughput:",
        format!("{} MB/sec", format_optional(callouts.peak_throughput_mb_sec)),
    ));
    out.push_str(&line("Best Configuration:", callouts.best_configuration.clone()));

    if report.has_producer() {
        out.push('\n');
        out.push_str(&render_table(TestMode::Producer, &report.producer_topics));
    }
    if report.has_consumer() {
        out.push('\n');
        out.push_str(&render_table(TestMode::Consumer, &report.consumer_topics));
    }

    if !report.insights.is_empty() {
        out.push_str("\nKey Insights\n");
        for insight in &report.insights {
            out.push_str(&format!("- {}: {}\n", insight.title, insight.detail));
        }
    }
    out
}

fn render_table(mode: TestMode, rows: &[TopicSummary]) -> String {
    let mut headers = vec!["Topic", "Avg Throughput (MB/sec)", "Avg Records/sec"];
    let title = match mode {
        TestMode::Producer => {
            headers.push("Avg Latency (ms)");
            "Producer Performance by Topic"
        }
        TestMode::Consumer => "Consumer Performance by Topic",
    };

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.topic.clone(),
                format_optional(row.mean_throughput_mb_sec),
                format_optional(row.mean_records_per_sec),
            ];
            if mode == TestMode::Producer {
                cells.push(format_optional(row.mean_avg_latency_ms));
            }
            cells
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|c| display_width(&c[i]))
                .chain(std::iter::once(display_width(h)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    // Topic left-aligned, numbers right-aligned.
    let format_row = |values: &[&str]| {
        let line: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if i == 0 {
                    pad_right(v, widths[i])
                } else {
                    pad_left(v, widths[i])
                }
            })
            .collect();
        format!("{}\n", line.join(GAP))
    };

    let mut out = format!("{title}\n");
    out.push_str(&format_row(&headers));
    for row in &cells {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_row(&values));
    }
    out
}
