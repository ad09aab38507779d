//! Progress indicator utilities for long-running suites.
//!
//! Bars are drawn only when stderr is an interactive terminal, so piped
//! output and CI logs stay clean.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};

/// Check if we should show progress indicators.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Create a determinate progress bar for a known number of tests.
///
/// # Panics
/// Panics if the progress bar template string is invalid.
#[must_use]
pub fn create_progress_bar(total: u64, message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if show {
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .expect("valid template")
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// Progress bar for one suite run; hidden unless stderr is a terminal.
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    /// Create a new progress tracker with a determinate total.
    #[must_use]
    pub fn new(total: u64, message: &str) -> Self {
        Self::with_visibility(total, message, should_show_progress())
    }

    /// Create a tracker with explicit visibility.
    #[must_use]
    pub fn with_visibility(total: u64, message: &str, showing: bool) -> Self {
        Self {
            bar: create_progress_bar(total, message, showing),
        }
    }

    /// Increment the progress.
    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    /// Update the message.
    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Finish and clear the progress bar.
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_hidden_when_not_terminal() {
        let pb = create_progress_bar(5, "Test", false);
        pb.inc(3);
        pb.finish();
    }

    #[test]
    fn test_progress_tracker_counts() {
        let tracker = ProgressTracker::with_visibility(10, "Running benchmarks", false);
        for _ in 0..4 {
            tracker.inc(1);
        }
        tracker.set_message("p1-rf1-producer");
        assert_eq!(tracker.bar.position(), 4);
        tracker.finish_and_clear();
    }
}
