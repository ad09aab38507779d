//! Suite Orchestrator: runs producer then consumer configs in order.
//!
//! Individual failures never stop the suite. The returned outcome list has
//! one entry per submitted config, in invocation order.

use crate::model::{RunOutcome, RunStatus, TestConfig};
use crate::runner::{CommandExecutor, Runner};
use crate::util::progress::ProgressTracker;
use crate::util::time::display_time;
use chrono::Local;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Pause between consecutive invocations.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Counts by status for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub errored: usize,
}

impl SuiteSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[RunOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                RunStatus::Success => summary.succeeded += 1,
                RunStatus::Failed => summary.failed += 1,
                RunStatus::Timeout => summary.timed_out += 1,
                RunStatus::Error => summary.errored += 1,
            }
        }
        summary
    }
}

/// Sequences benchmark runs through a [`Runner`].
pub struct Suite<E> {
    runner: Runner<E>,
    cooldown: Duration,
}

impl<E: CommandExecutor> Suite<E> {
    #[must_use]
    pub const fn new(runner: Runner<E>) -> Self {
        Self {
            runner,
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Run every producer config, then every consumer config.
    ///
    /// Consecutive invocations are separated by the cooldown.
    pub fn run(&self, producers: &[TestConfig], consumers: Option<&[TestConfig]>) -> Vec<RunOutcome> {
        let consumers = consumers.unwrap_or_default();
        let total = producers.len() + consumers.len();

        info!(
            time = %display_time(&Local::now()),
            bootstrap_servers = %self.runner.bootstrap_servers(),
            tests = total,
            "Kafka Benchmark Test Suite"
        );

        let progress = ProgressTracker::new(total as u64, "Running benchmarks");
        let mut outcomes = Vec::with_capacity(total);

        for (label, block) in [("PRODUCER", producers), ("CONSUMER", consumers)] {
            if block.is_empty() {
                continue;
            }
            info!(tests = block.len(), "{label} TESTS");

            for config in block {
                if !outcomes.is_empty() && !self.cooldown.is_zero() {
                    std::thread::sleep(self.cooldown);
                }
                progress.set_message(config.test_name.clone());
                outcomes.push(self.runner.run_test(config));
                progress.inc(1);
            }
        }

        let summary = SuiteSummary::from_outcomes(&outcomes);
        progress.finish_and_clear();
        info!(
            total = summary.total,
            successful = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            errored = summary.errored,
            "Test Suite Completed"
        );

        outcomes
    }
}
