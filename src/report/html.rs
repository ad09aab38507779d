//! Standalone HTML page for a [`Report`].
//!
//! Styles are inline and the chart is drawn by plotly.js loaded from its CDN.

use super::{Report, TopicSummary};
use crate::error::{Result, ResultExt};
use crate::format::{format_count, format_optional, html_escape};
use crate::model::TestMode;
use crate::store::write_atomic;
use crate::util::time::display_time;
use chrono::Local;
use std::path::Path;
use tracing::info;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-latest.min.js";
const CHART_TITLE: &str = "Kafka Benchmark Results";

const STYLE: &str = r"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .container {
            max-width: 1400px;
            margin: 0 auto;
            background: white;
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            border-bottom: 3px solid #007acc;
            padding-bottom: 10px;
        }
        .summary {
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
            margin: 20px 0;
        }
        .summary h2 { color: #007acc; margin-top: 0; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background-color: #007acc; color: white; font-weight: 600; }
        tr:hover { background-color: #f5f5f5; }
        .metric { display: inline-block; margin: 10px 20px 10px 0; }
        .metric-label { color: #666; font-size: 0.9em; }
        .metric-value { font-size: 1.5em; font-weight: bold; color: #007acc; }
        .footer {
            margin-top: 30px;
            padding-top: 20px;
            border-top: 1px solid #ddd;
            text-align: center;
            color: #666;
        }
";

/// Render the full page. `generated_at` is shown in the chart title and
/// footer.
#[must_use]
pub fn render_html(report: &Report, generated_at: &str) -> String {
    let figure = report
        .chart
        .to_plotly(&format!("{CHART_TITLE} - {generated_at}"));
    // A literal `</script>` inside string data would end the element early.
    let figure_json = figure.to_string().replace("</", "<\\/");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str("    <title>Kafka Benchmark Report</title>\n");
    html.push_str(&format!("    <script src=\"{PLOTLY_CDN}\"></script>\n"));
    html.push_str(&format!("    <style>{STYLE}    </style>\n"));
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");
    html.push_str("<h1>Kafka Performance Benchmark Report</h1>\n");

    html.push_str(&render_summary(report));

    html.push_str("<div id=\"charts\"></div>\n");
    html.push_str("<script>\n");
    html.push_str(&format!("    var figure = {figure_json};\n"));
    html.push_str(
        "    Plotly.newPlot('charts', figure.data, figure.layout, {responsive: true});\n",
    );
    html.push_str("</script>\n");

    html.push_str(&format!(
        "<div class=\"footer\">\n    <p>Generated on {}</p>\n</div>\n",
        html_escape(generated_at)
    ));
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_summary(report: &Report) -> String {
    let callouts = &report.callouts;
    let mut out = String::new();
    out.push_str("<div class=\"summary\">\n<h2>Summary Statistics</h2>\n");

    let metric = |label: &str, value: &str| {
        format!(
            "<div class=\"metric\">\n    <div class=\"metric-label\">{label}</div>\n    <div class=\"metric-value\">{value}</div>\n</div>\n"
        )
    };
    out.push_str(&metric("Total Records Tested", &format_count(callouts.total_records)));
    out.push_str(&metric(
        "Average Throughput",
        &format!("{} MB/sec", format_optional(callouts.mean_throughput_mb_sec)),
    ));
    out.push_str(&metric(
        "Peak Throughput",
        &format!("{} MB/sec", format_optional(callouts.peak_throughput_mb_sec)),
    ));
    out.push_str(&metric(
        "Best Configuration",
        &html_escape(&callouts.best_configuration),
    ));

    if report.has_producer() {
        out.push_str(&render_table(TestMode::Producer, &report.producer_topics));
    }
    if report.has_consumer() {
        out.push_str(&render_table(TestMode::Consumer, &report.consumer_topics));
    }

    out.push_str("<h3>Key Insights</h3>\n<ul>\n");
    for insight in &report.insights {
        out.push_str(&format!(
            "    <li><strong>{}:</strong> {}</li>\n",
            html_escape(insight.title),
            html_escape(insight.detail)
        ));
    }
    out.push_str("</ul>\n</div>\n");
    out
}

fn render_table(mode: TestMode, rows: &[TopicSummary]) -> String {
    let with_latency = mode == TestMode::Producer;
    let heading = match mode {
        TestMode::Producer => "Producer Performance by Topic",
        TestMode::Consumer => "Consumer Performance by Topic",
    };

    let mut out = format!("<h3>{heading}</h3>\n<table>\n<thead>\n<tr>");
    out.push_str("<th>Topic</th><th>Avg Throughput (MB/sec)</th><th>Avg Records/sec</th>");
    if with_latency {
        out.push_str("<th>Avg Latency (ms)</th>");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        out.push_str(&format!(
            "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td>",
            html_escape(&row.topic),
            format_optional(row.mean_throughput_mb_sec),
            format_optional(row.mean_records_per_sec),
        ));
        if with_latency {
            out.push_str(&format!("<td>{}</td>", format_optional(row.mean_avg_latency_ms)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

/// Render with the current local time and write `path` atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_html(report: &Report, path: &Path) -> Result<()> {
    let html = render_html(report, &display_time(&Local::now()));
    write_atomic(path, html.as_bytes())
        .with_context(|| format!("writing report to {}", path.display()))?;
    info!(path = %path.display(), "HTML report generated");
    Ok(())
}
