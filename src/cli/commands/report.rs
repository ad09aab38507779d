//! `kbench report`: rebuild the HTML report from a saved results file.

use super::print_json;
use crate::cli::{GlobalOpts, ReportArgs};
use crate::error::Result;
use crate::report::{self, Report};
use crate::store::{ResultStore, report_file_name, stamp_from_results_path};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ReportOutput<'a> {
    results_file: &'a Path,
    report_file: Option<&'a Path>,
    report: Option<serde_json::Value>,
}

/// Execute the report command.
///
/// # Errors
///
/// Returns an error if the results file is missing or malformed, or the
/// report cannot be written.
pub fn execute(args: &ReportArgs, opts: &GlobalOpts) -> Result<()> {
    let (report, written) = regenerate(&args.results, args.output.as_deref())?;

    if opts.json {
        return print_json(&ReportOutput {
            results_file: &args.results,
            report_file: written.as_deref(),
            report: report.as_ref().map(Report::summary_json),
        });
    }
    if opts.quiet {
        return Ok(());
    }

    match (&report, &written) {
        (Some(report), Some(path)) => {
            print!("{}", report::render_text(report));
            println!();
            println!("HTML report generated: {}", path.display());
        }
        _ => println!("No successful test results to generate report"),
    }
    Ok(())
}

/// Load `results` and write its report to `output` (or the default path).
///
/// Returns the report and where it was written; both are `None` when the
/// file holds no successful runs.
///
/// # Errors
///
/// Returns an error if loading or writing fails.
pub fn regenerate(
    results: &Path,
    output: Option<&Path>,
) -> Result<(Option<Report>, Option<PathBuf>)> {
    let outcomes = ResultStore::load(results)?;
    let Some(report) = report::build_report(&outcomes) else {
        return Ok((None, None));
    };

    let path = output.map_or_else(|| default_report_path(results), Path::to_path_buf);
    report::write_html(&report, &path)?;
    Ok((Some(report), Some(path)))
}

/// `benchmark_report_<stamp>.html` next to a standard results file, or the
/// results path with an `.html` extension otherwise.
#[must_use]
pub fn default_report_path(results: &Path) -> PathBuf {
    match stamp_from_results_path(results) {
        Some(stamp) => results.with_file_name(report_file_name(stamp)),
        None => results.with_extension("html"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::model::{RunOutcome, TestConfig};
    use crate::report::tests::sample_outcomes;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn default_path_follows_stamp() {
        assert_eq!(
            default_report_path(Path::new("/out/benchmark_results_20260301_101530.json")),
            PathBuf::from("/out/benchmark_report_20260301_101530.html")
        );
        assert_eq!(
            default_report_path(Path::new("/out/nightly.json")),
            PathBuf::from("/out/nightly.html")
        );
        assert_eq!(
            default_report_path(Path::new("/out/benchmark_results_nightly.json")),
            PathBuf::from("/out/benchmark_results_nightly.html")
        );
    }

    #[test]
    fn regenerates_next_to_results() {
        let temp = TempDir::new().unwrap();
        let store = ResultStore::new(temp.path());
        let results = store.persist(&sample_outcomes(), "20260301_101530").unwrap();

        let (report, path) = regenerate(&results, None).unwrap();
        assert!(report.unwrap().has_consumer());
        let path = path.unwrap();
        assert_eq!(path, temp.path().join("benchmark_report_20260301_101530.html"));
        assert!(path.is_file());
    }

    #[test]
    fn explicit_output_path() {
        let temp = TempDir::new().unwrap();
        let results = ResultStore::new(temp.path())
            .persist(&sample_outcomes(), "20260301_101530")
            .unwrap();
        let target = temp.path().join("nested").join("custom.html");
        let (_, path) = regenerate(&results, Some(&target)).unwrap();
        assert_eq!(path.as_deref(), Some(target.as_path()));
        assert!(target.is_file());
    }

    #[test]
    fn all_failed_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let config = TestConfig::consumer("p1-rf1", 10).unwrap();
        let outcomes = vec![RunOutcome::timed_out(config, 300.0, Utc::now())];
        let results = ResultStore::new(temp.path())
            .persist(&outcomes, "20260301_101530")
            .unwrap();

        let (report, path) = regenerate(&results, None).unwrap();
        assert!(report.is_none());
        assert!(path.is_none());
        assert!(!temp.path().join("benchmark_report_20260301_101530.html").exists());
    }

    #[test]
    fn missing_results_file() {
        let temp = TempDir::new().unwrap();
        let err = regenerate(&temp.path().join("absent.json"), None).unwrap_err();
        assert!(matches!(err, BenchError::ResultsNotFound { .. }));
    }
}
