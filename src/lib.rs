//! `kafka_bench`: drive Kafka perf-test tools and report on the results.
//!
//! The pipeline runs leaves first:
//! - [`parse`] turns raw tool output into a [`model::MetricSet`]
//! - [`runner`] invokes one tool under a timeout and builds a [`model::RunOutcome`]
//! - [`suite`] sequences many runs with a cooldown between them
//! - [`store`] persists the outcomes as JSON
//! - [`report`] aggregates successful outcomes into an HTML/text report

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod parse;
pub mod report;
pub mod runner;
pub mod store;
pub mod suite;
pub mod util;

pub use error::{BenchError, ErrorCode, Result, StructuredError};
