//! Chart layout for the HTML report.
//!
//! The layout is a 3 x 2 grid of panels. [`ChartLayout::to_plotly`] turns it
//! into the `data` and `layout` objects that `Plotly.newPlot` expects.

use super::aggregate::{Sample, TopicSummary, ordered_topics};
use crate::model::MetricSet;
use serde::Serialize;
use serde_json::{Value, json};

pub const ROWS: usize = 3;
pub const COLS: usize = 2;
pub const HEIGHT_PX: u32 = 1400;
pub const SPACING: f64 = 0.12;
pub const TICK_ANGLE: i32 = -45;

pub const PRODUCER_COLOR: &str = "#1f77b4";
pub const CONSUMER_COLOR: &str = "#2ca02c";
pub const SINGLE_MODE_COLOR: &str = "#8c564b";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Fixed colour for the standard topics.
#[must_use]
pub fn topic_color(topic: &str) -> Option<&'static str> {
    match topic {
        "p1-rf1" => Some("#1f77b4"),
        "p1-rf3" => Some("#ff7f0e"),
        "p3-rf3" => Some("#2ca02c"),
        "p12-rf3" => Some("#d62728"),
        "p30-rf3" => Some("#9467bd"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Bar,
    Scatter,
}

/// An x coordinate: a category label or a number (scatter plots).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coord {
    Label(String),
    Value(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub kind: TraceKind,
    pub name: Option<String>,
    pub x: Vec<Coord>,
    pub y: Vec<f64>,
    /// One colour per point.
    pub colors: Vec<String>,
    /// Label drawn next to each point.
    pub text: Vec<String>,
}

impl Trace {
    fn new(kind: TraceKind, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
            x: Vec::new(),
            y: Vec::new(),
            colors: Vec::new(),
            text: Vec::new(),
        }
    }

    fn push(&mut self, x: Coord, y: f64, color: &str, text: String) {
        self.x.push(x);
        self.y.push(y);
        self.colors.push(color.to_string());
        self.text.push(text);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    fn to_plotly(&self, axis: usize) -> Value {
        let suffix = axis_suffix(axis);
        let mut trace = json!({
            "type": self.kind,
            "x": self.x,
            "y": self.y,
            "xaxis": format!("x{suffix}"),
            "yaxis": format!("y{suffix}"),
            "marker": { "color": self.colors },
            "text": self.text,
        });
        match self.kind {
            TraceKind::Bar => trace["textposition"] = json!("outside"),
            TraceKind::Scatter => {
                trace["mode"] = json!("markers+text");
                trace["textposition"] = json!("top center");
            }
        }
        if let Some(name) = &self.name {
            trace["name"] = json!(name);
        }
        trace
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: &'static str,
    pub traces: Vec<Trace>,
}

impl Panel {
    fn new(title: &'static str, traces: impl IntoIterator<Item = Option<Trace>>) -> Self {
        Self {
            title,
            traces: traces.into_iter().flatten().collect(),
        }
    }
}

/// Six panels in row-major order plus figure-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub panels: Vec<Panel>,
    pub show_legend: bool,
}

impl ChartLayout {
    /// Panel titles in row-major order.
    #[must_use]
    pub fn titles(&self) -> Vec<&'static str> {
        self.panels.iter().map(|p| p.title).collect()
    }

    /// Plotly figure as `{"data": [...], "layout": {...}}`.
    #[must_use]
    pub fn to_plotly(&self, title: &str) -> Value {
        let mut data = Vec::new();
        let mut annotations = Vec::new();
        let mut layout = json!({
            "title": { "text": title },
            "height": HEIGHT_PX,
            "showlegend": self.show_legend,
            "barmode": "group",
            "paper_bgcolor": "white",
            "plot_bgcolor": "white",
        });

        for (index, panel) in self.panels.iter().enumerate() {
            let (x_domain, y_domain) = cell_domain(index);
            let suffix = axis_suffix(index);

            data.extend(panel.traces.iter().map(|t| t.to_plotly(index)));

            layout[format!("xaxis{suffix}")] = json!({
                "domain": x_domain,
                "anchor": format!("y{suffix}"),
                "tickangle": TICK_ANGLE,
                "gridcolor": "#EBF0F8",
            });
            layout[format!("yaxis{suffix}")] = json!({
                "domain": y_domain,
                "anchor": format!("x{suffix}"),
                "gridcolor": "#EBF0F8",
            });
            annotations.push(json!({
                "text": panel.title,
                "x": (x_domain[0] + x_domain[1]) / 2.0,
                "y": y_domain[1],
                "xref": "paper",
                "yref": "paper",
                "xanchor": "center",
                "yanchor": "bottom",
                "showarrow": false,
                "font": { "size": 16 },
            }));
        }
        layout["annotations"] = Value::Array(annotations);

        json!({ "data": data, "layout": layout })
    }
}

/// Plotly names the first axis `x`, then `x2`, `x3`, ...
fn axis_suffix(index: usize) -> String {
    if index == 0 {
        String::new()
    } else {
        (index + 1).to_string()
    }
}

/// Paper-coordinate domains of grid cell `index` (row-major, row 0 on top).
#[must_use]
pub fn cell_domain(index: usize) -> ([f64; 2], [f64; 2]) {
    let row = index / COLS;
    let col = index % COLS;
    let width = (1.0 - SPACING * (COLS - 1) as f64) / COLS as f64;
    let height = (1.0 - SPACING * (ROWS - 1) as f64) / ROWS as f64;

    let x0 = col as f64 * (width + SPACING);
    let y1 = 1.0 - row as f64 * (height + SPACING);
    ([x0, x0 + width], [y1 - height, y1])
}

/// Bar per run of one metric, coloured by topic. Runs missing the metric are
/// left out.
fn run_bars(
    samples: &[Sample<'_>],
    name: Option<&str>,
    fallback_color: &str,
    decimals: usize,
    field: fn(&MetricSet) -> Option<f64>,
) -> Option<Trace> {
    let mut trace = Trace::new(TraceKind::Bar, name);
    for sample in samples {
        if let Some(value) = field(sample.metrics) {
            trace.push(
                Coord::Label(sample.test_name().to_string()),
                value,
                topic_color(sample.topic()).unwrap_or(fallback_color),
                format!("{value:.decimals$}"),
            );
        }
    }
    (!trace.is_empty()).then_some(trace)
}

/// Bar per topic from pre-aggregated values.
fn topic_bars(
    rows: &[(&str, f64)],
    name: Option<&str>,
    color: Option<&str>,
) -> Option<Trace> {
    let mut trace = Trace::new(TraceKind::Bar, name);
    for (topic, value) in rows {
        trace.push(
            Coord::Label((*topic).to_string()),
            *value,
            color.or_else(|| topic_color(topic)).unwrap_or(SINGLE_MODE_COLOR),
            format!("{value:.2}"),
        );
    }
    (!trace.is_empty()).then_some(trace)
}

fn producer_volume_mb(sample: &Sample<'_>) -> Option<f64> {
    let records = sample.metrics.records_sent?;
    let size = sample.outcome.config.record_size?;
    Some(records * size as f64 / BYTES_PER_MB)
}

fn consumer_volume_mb(sample: &Sample<'_>) -> Option<f64> {
    sample.metrics.data_consumed_mb
}

/// Sum of a per-run volume grouped by topic, in display order.
fn volume_by_topic<'a>(
    samples: &[Sample<'a>],
    volume: fn(&Sample<'_>) -> Option<f64>,
) -> Vec<(&'a str, f64)> {
    ordered_topics(samples)
        .into_iter()
        .filter_map(|topic| {
            let values: Vec<f64> = samples
                .iter()
                .filter(|s| s.topic() == topic)
                .filter_map(volume)
                .collect();
            (!values.is_empty()).then(|| (topic, values.iter().sum()))
        })
        .collect()
}

/// Layout when both producer and consumer runs succeeded.
#[must_use]
pub fn combined_layout(
    producers: &[Sample<'_>],
    consumers: &[Sample<'_>],
    producer_rows: &[TopicSummary],
    consumer_rows: &[TopicSummary],
) -> ChartLayout {
    let mut producer_means = Vec::new();
    let mut consumer_means = Vec::new();
    for prow in producer_rows {
        let Some(crow) = consumer_rows.iter().find(|c| c.topic == prow.topic) else {
            continue;
        };
        if let (Some(p), Some(c)) = (prow.mean_throughput_mb_sec, crow.mean_throughput_mb_sec) {
            producer_means.push((prow.topic.as_str(), p));
            consumer_means.push((prow.topic.as_str(), c));
        }
    }

    let panels = vec![
        Panel::new(
            "Producer Throughput (MB/sec)",
            [run_bars(producers, Some("Producer"), PRODUCER_COLOR, 2, |m| m.throughput_mb_sec)],
        ),
        Panel::new(
            "Producer Latency (ms)",
            [run_bars(producers, Some("Avg Latency"), PRODUCER_COLOR, 2, |m| m.avg_latency_ms)],
        ),
        Panel::new(
            "Consumer Throughput (MB/sec)",
            [run_bars(consumers, Some("Consumer"), CONSUMER_COLOR, 2, |m| m.throughput_mb_sec)],
        ),
        Panel::new(
            "Consumer Records/sec",
            [run_bars(consumers, Some("Consumer Recs/sec"), CONSUMER_COLOR, 0, |m| m.records_per_sec)],
        ),
        Panel::new(
            "Producer vs Consumer Comparison",
            [
                topic_bars(&producer_means, Some("Producer"), Some(PRODUCER_COLOR)),
                topic_bars(&consumer_means, Some("Consumer"), Some(CONSUMER_COLOR)),
            ],
        ),
        Panel::new(
            "Producer Records/sec",
            [run_bars(producers, Some("Producer Recs/sec"), PRODUCER_COLOR, 0, |m| m.records_per_sec)],
        ),
    ];

    ChartLayout {
        panels,
        show_legend: true,
    }
}

/// Layout for a producer-only report.
#[must_use]
pub fn producer_layout(producers: &[Sample<'_>]) -> ChartLayout {
    let mut scatter = Trace::new(TraceKind::Scatter, None);
    for sample in producers {
        if let (Some(throughput), Some(latency)) =
            (sample.metrics.throughput_mb_sec, sample.metrics.avg_latency_ms)
        {
            scatter.push(
                Coord::Value(throughput),
                latency,
                topic_color(sample.topic()).unwrap_or(SINGLE_MODE_COLOR),
                sample.test_name().to_string(),
            );
        }
    }
    let volume = volume_by_topic(producers, producer_volume_mb);

    ChartLayout {
        panels: vec![
            Panel::new(
                "Throughput (MB/sec)",
                [run_bars(producers, None, SINGLE_MODE_COLOR, 2, |m| m.throughput_mb_sec)],
            ),
            Panel::new(
                "Records Per Second",
                [run_bars(producers, None, SINGLE_MODE_COLOR, 0, |m| m.records_per_sec)],
            ),
            Panel::new(
                "Average Latency (ms)",
                [run_bars(producers, None, SINGLE_MODE_COLOR, 2, |m| m.avg_latency_ms)],
            ),
            Panel::new(
                "Max Latency (ms)",
                [run_bars(producers, None, SINGLE_MODE_COLOR, 2, |m| m.max_latency_ms)],
            ),
            Panel::new("Throughput vs Latency", [(!scatter.is_empty()).then_some(scatter)]),
            Panel::new("Total Data Volume (MB)", [topic_bars(&volume, None, None)]),
        ],
        show_legend: false,
    }
}

/// Layout for a consumer-only report.
#[must_use]
pub fn consumer_layout(consumers: &[Sample<'_>], consumer_rows: &[TopicSummary]) -> ChartLayout {
    let overview: Vec<(&str, f64)> = consumer_rows
        .iter()
        .filter_map(|row| Some((row.topic.as_str(), row.mean_throughput_mb_sec?)))
        .collect();
    let volume = volume_by_topic(consumers, consumer_volume_mb);

    ChartLayout {
        panels: vec![
            Panel::new(
                "Throughput (MB/sec)",
                [run_bars(consumers, None, SINGLE_MODE_COLOR, 2, |m| m.throughput_mb_sec)],
            ),
            Panel::new(
                "Records Per Second",
                [run_bars(consumers, None, SINGLE_MODE_COLOR, 0, |m| m.records_per_sec)],
            ),
            Panel::new(
                "Data Consumed (MB)",
                [run_bars(consumers, None, SINGLE_MODE_COLOR, 2, |m| m.data_consumed_mb)],
            ),
            Panel::new(
                "Fetch Time (ms)",
                [run_bars(consumers, None, SINGLE_MODE_COLOR, 0, |m| m.fetch_time_ms)],
            ),
            Panel::new("Performance Overview", [topic_bars(&overview, None, None)]),
            Panel::new("Total Data Volume (MB)", [topic_bars(&volume, None, None)]),
        ],
        show_legend: false,
    }
}
