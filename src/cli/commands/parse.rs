//! `kbench parse`: run the metric parser over captured tool output.

use super::print_json;
use crate::cli::ParseArgs;
use crate::error::{Result, ResultExt};
use crate::model::TestMode;
use crate::parse::parse_output;
use std::fs;
use std::io::{self, Read};
use tracing::debug;

/// Execute the parse command. Always prints JSON; an unreadable capture
/// yields `{}`.
///
/// # Errors
///
/// Returns an error if the input cannot be read.
pub fn execute(args: &ParseArgs) -> Result<()> {
    let text = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mode = TestMode::from(args.mode);
    let metrics = parse_output(mode, &text);
    debug!(mode = mode.as_str(), fields = ?metrics, "Parsed capture");
    print_json(&metrics)
}
