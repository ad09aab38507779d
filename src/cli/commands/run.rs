//! `kbench run`: execute the topic matrix, then persist and report.

use super::print_json;
use crate::cli::{GlobalOpts, RunArgs};
use crate::config::{self, BenchSettings};
use crate::error::Result;
use crate::model::RunOutcome;
use crate::report::{self, Report};
use crate::runner::{BinaryLocator, CommandExecutor, ProcessExecutor, Runner};
use crate::store::{ResultStore, report_file_name};
use crate::suite::{Suite, SuiteSummary};
use crate::util::ensure_output_dir;
use crate::util::time::run_stamp;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files and data produced by one run.
#[derive(Debug)]
pub struct RunArtifacts {
    pub outcomes: Vec<RunOutcome>,
    pub summary: SuiteSummary,
    pub results_path: PathBuf,
    pub report: Option<Report>,
    pub report_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    results_file: &'a Path,
    report_file: Option<&'a Path>,
    summary: SuiteSummary,
    report: Option<serde_json::Value>,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error for bad configuration, an unusable output directory, or
/// a failure writing results or report. Individual test failures are not
/// errors.
pub fn execute(args: &RunArgs, opts: &GlobalOpts) -> Result<()> {
    let layer = config::load_config(opts.config.as_deref(), &args.overrides())?;
    let settings = BenchSettings::from_layer(&layer)?;
    debug!(?settings, "Resolved settings");

    let artifacts = run_with_executor(&settings, ProcessExecutor)?;

    if opts.json {
        return print_json(&RunOutput {
            results_file: &artifacts.results_path,
            report_file: artifacts.report_path.as_deref(),
            summary: artifacts.summary,
            report: artifacts.report.as_ref().map(Report::summary_json),
        });
    }
    if opts.quiet {
        return Ok(());
    }

    match &artifacts.report {
        Some(report) => print!("{}", report::render_text(report)),
        None => println!("No successful test results to generate report"),
    }
    println!();
    println!("Results saved to: {}", artifacts.results_path.display());
    if let Some(path) = &artifacts.report_path {
        println!("HTML report generated: {}", path.display());
    }
    Ok(())
}

/// Run the suite described by `settings` through `executor`, then write the
/// results file and, when anything succeeded, the HTML report.
///
/// The output directory is checked before the first test starts.
///
/// # Errors
///
/// Returns an error if the output directory is unusable or a file cannot be
/// written.
pub fn run_with_executor<E: CommandExecutor>(
    settings: &BenchSettings,
    executor: E,
) -> Result<RunArtifacts> {
    ensure_output_dir(&settings.output_dir)?;

    let producers = settings.producer_configs()?;
    let consumers = settings.consumer_configs()?;

    let locator = BinaryLocator::new(settings.kafka_bin.clone())
        .with_commands(&settings.producer_command, &settings.consumer_command);
    let runner = Runner::with_executor(&settings.bootstrap_servers, locator, executor)
        .with_timeout(settings.timeout);
    let suite = Suite::new(runner).with_cooldown(settings.cooldown);

    let outcomes = suite.run(&producers, consumers.as_deref());
    let summary = SuiteSummary::from_outcomes(&outcomes);

    let stamp = run_stamp(&Local::now());
    let results_path = ResultStore::new(&settings.output_dir).persist(&outcomes, &stamp)?;

    let report = report::build_report(&outcomes);
    let report_path = match &report {
        Some(report) => {
            let path = settings.output_dir.join(report_file_name(&stamp));
            report::write_html(report, &path)?;
            Some(path)
        }
        None => None,
    };

    info!(
        results = %results_path.display(),
        report = ?report_path,
        "Run finished"
    );

    Ok(RunArtifacts {
        outcomes,
        summary,
        results_path,
        report,
        report_path,
    })
}
