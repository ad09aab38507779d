use clap::Parser;
use kafka_bench::cli::commands;
use kafka_bench::cli::{Cli, Commands};
use kafka_bench::logging::init_logging;
use kafka_bench::{BenchError, StructuredError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        handle_error(&BenchError::from(e), cli.json);
    }

    let opts = cli.global_opts();

    let result = match &cli.command {
        Commands::Run(args) => commands::run::execute(args, &opts),
        Commands::Report(args) => commands::report::execute(args, &opts),
        Commands::Parse(args) => commands::parse::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs a human-readable error with optional color.
fn handle_error(err: &BenchError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}
