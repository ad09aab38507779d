//! Timestamp helpers shared by the result store and the report.

use chrono::{DateTime, NaiveDateTime, TimeZone};

/// Format used in output file names (`20260301_101530`).
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Format used in human-facing text (`2026-03-01 10:15:30`).
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stamp identifying one benchmark run in file names.
#[must_use]
pub fn run_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(RUN_STAMP_FORMAT).to_string()
}

/// Human-readable timestamp.
#[must_use]
pub fn display_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(DISPLAY_FORMAT).to_string()
}

/// Parse a run stamp back into the wall-clock time it was taken at.
#[must_use]
pub fn parse_run_stamp(stamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(stamp, RUN_STAMP_FORMAT).ok()
}
