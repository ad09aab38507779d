//! Error types and handling for `kafka_bench`.
//!
//! Per-test failures are never errors: they are recorded as a
//! [`RunStatus`](crate::model::RunStatus) on the outcome. `BenchError` covers
//! everything that stops the process itself: bad input, unreadable config or
//! results files, and an unusable output directory.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration through a transparent variant
//! - Provides recovery hints for user-facing errors
//! - Maps to structured JSON output via [`StructuredError`]

mod context;
mod structured;

pub use context::{OptionExt, ResultExt};
pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `kafka_bench` operations.
#[derive(Error, Debug)]
pub enum BenchError {
    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Unknown acknowledgement level.
    #[error("Invalid acks value: {value}")]
    InvalidAcks { value: String },

    /// Unknown test mode.
    #[error("Invalid test mode: {value}")]
    InvalidMode { value: String },

    // === Results Errors ===
    /// Results file does not exist.
    #[error("Results file not found at '{path}'")]
    ResultsNotFound { path: PathBuf },

    /// Results file exists but is not a valid outcome list.
    #[error("Failed to parse results file '{path}': {reason}")]
    ResultsParse { path: PathBuf, reason: String },

    // === Output Errors ===
    /// Output directory cannot be created or written.
    #[error("Output directory '{path}' is not usable: {reason}")]
    OutputDirUnavailable { path: PathBuf, reason: String },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BenchError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidAcks { .. }
                | Self::InvalidMode { .. }
                | Self::ResultsNotFound { .. }
                | Self::OutputDirUnavailable { .. }
                | Self::Config(_)
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidAcks { .. } => Some("Valid acks values: 0, 1, all"),
            Self::InvalidMode { .. } => Some("Valid modes: producer, consumer"),
            Self::ResultsNotFound { .. } => {
                Some("Pass a benchmark_results_*.json file written by 'kbench run'")
            }
            Self::OutputDirUnavailable { .. } => {
                Some("Choose a writable directory with --output-dir")
            }
            Self::Validation { .. } => Some("Record counts and sizes must be positive"),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `BenchError`.
pub type Result<T> = std::result::Result<T, BenchError>;
