//! Result Store: JSON persistence for a finished run.
//!
//! The file is a pretty-printed array of outcome objects, failures included,
//! so a report can be regenerated later without rerunning anything.

use crate::error::{BenchError, Result, ResultExt};
use crate::model::RunOutcome;
use crate::util::time::parse_run_stamp;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const RESULTS_PREFIX: &str = "benchmark_results_";
const REPORT_PREFIX: &str = "benchmark_report_";

/// `benchmark_results_<stamp>.json`
#[must_use]
pub fn results_file_name(stamp: &str) -> String {
    format!("{RESULTS_PREFIX}{stamp}.json")
}

/// `benchmark_report_<stamp>.html`
#[must_use]
pub fn report_file_name(stamp: &str) -> String {
    format!("{REPORT_PREFIX}{stamp}.html")
}

/// Recover the run stamp from a results file name.
///
/// Only names written by [`ResultStore::persist`] qualify; a renamed file
/// such as `benchmark_results_nightly.json` yields `None`.
#[must_use]
pub fn stamp_from_results_path(path: &Path) -> Option<&str> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(RESULTS_PREFIX)
        .filter(|stamp| parse_run_stamp(stamp).is_some())
}

/// Writes and reads result files in one output directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    output_dir: PathBuf,
}

impl ResultStore {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Persist `outcomes` as `benchmark_results_<stamp>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn persist(&self, outcomes: &[RunOutcome], stamp: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(results_file_name(stamp));
        let json = serde_json::to_string_pretty(outcomes)?;
        write_atomic(&path, json.as_bytes())
            .with_context(|| format!("writing results to {}", path.display()))?;

        info!(path = %path.display(), outcomes = outcomes.len(), "Results saved");
        Ok(path)
    }

    /// Load outcomes written by [`ResultStore::persist`].
    ///
    /// # Errors
    ///
    /// Returns `ResultsNotFound` for a missing file and `ResultsParse` when
    /// the content is not an outcome list.
    pub fn load(path: &Path) -> Result<Vec<RunOutcome>> {
        if !path.is_file() {
            return Err(BenchError::ResultsNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let outcomes: Vec<RunOutcome> =
            serde_json::from_str(&contents).map_err(|e| BenchError::ResultsParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), outcomes = outcomes.len(), "Loaded results");
        Ok(outcomes)
    }
}

/// Write via a temp file in the same directory, then rename over `path`.
///
/// # Errors
///
/// Returns any I/O error from creating, writing, syncing, or renaming.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    fs::rename(&temp_path, path)?;
    debug!(temp_path = %temp_path.display(), target_path = %path.display(), "Atomic write complete");
    Ok(())
}
