//! Shared utilities for `kafka_bench`.
//!
//! - Progress indicators (for the suite run)
//! - Timestamp formatting for file names and report headers
//! - Output directory preflight

pub mod progress;
pub mod time;

use crate::error::{BenchError, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;

const PROBE_FILE: &str = ".kbench-write-probe";

/// Make sure `dir` exists and accepts new files.
///
/// Checked once before any benchmark runs; a suite that cannot save its
/// results should not start.
///
/// # Errors
///
/// Returns `BenchError::OutputDirUnavailable` if the directory cannot be
/// created or written.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    let unavailable = |reason: String| BenchError::OutputDirUnavailable {
        path: dir.to_path_buf(),
        reason,
    };

    fs::create_dir_all(dir).map_err(|e| unavailable(e.to_string()))?;

    let probe = dir.join(PROBE_FILE);
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&probe)
        .map_err(|e| unavailable(e.to_string()))?;
    let _ = fs::remove_file(&probe);

    Ok(())
}
