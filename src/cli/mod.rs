//! CLI definitions and entry point.

use crate::config::{CliOverrides, TopicSpec};
use crate::model::TestMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Kafka producer/consumer benchmark driver
#[derive(Parser, Debug)]
#[command(name = "kbench", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ./kbench.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs as JSON lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn global_opts(&self) -> GlobalOpts {
        GlobalOpts {
            config: self.config.clone(),
            json: self.json,
            quiet: self.quiet,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the benchmark matrix and write results and report
    Run(RunArgs),

    /// Rebuild the HTML report from a saved results file
    Report(ReportArgs),

    /// Parse captured perf-test output and print the metrics as JSON
    Parse(ParseArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Comma-separated broker list
    #[arg(long)]
    pub bootstrap_servers: Option<String>,

    /// Directory containing the Kafka perf-test scripts (default: PATH lookup)
    #[arg(long)]
    pub kafka_bin: Option<PathBuf>,

    /// Where results and report files are written
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Records per producer test (messages per consumer test)
    #[arg(long)]
    pub num_records: Option<u64>,

    /// Producer record size in bytes
    #[arg(long)]
    pub record_size: Option<u64>,

    /// Run producer tests only
    #[arg(long)]
    pub skip_consumer: bool,

    /// Per-test timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Pause between tests in seconds
    #[arg(long, value_name = "SECS")]
    pub cooldown: Option<u64>,

    /// Topic to test as name[:acks[:label]] (repeatable; replaces the default matrix)
    #[arg(long = "topic", value_name = "SPEC")]
    pub topics: Vec<TopicSpec>,
}

impl RunArgs {
    /// Flags as the highest-precedence config layer.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bootstrap_servers: self.bootstrap_servers.clone(),
            kafka_bin: self.kafka_bin.clone(),
            output_dir: self.output_dir.clone(),
            num_records: self.num_records,
            record_size: self.record_size,
            skip_consumer: self.skip_consumer.then_some(true),
            timeout_secs: self.timeout,
            cooldown_secs: self.cooldown,
            topics: (!self.topics.is_empty()).then(|| self.topics.clone()),
        }
    }
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Results file written by `kbench run`
    pub results: PathBuf,

    /// Output HTML path (default: matching benchmark_report_<stamp>.html)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Which tool produced the output
    #[arg(value_enum)]
    pub mode: ModeArg,

    /// File with the captured output (default: stdin)
    pub file: Option<PathBuf>,
}

/// Tool selector for `kbench parse`.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ModeArg {
    #[value(alias = "produce")]
    Producer,
    #[value(alias = "consume")]
    Consumer,
}

impl From<ModeArg> for TestMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Producer => Self::Producer,
            ModeArg::Consumer => Self::Consumer,
        }
    }
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
