//! Structured error output for scripted callers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Hint for failures the user cannot fix by changing input alone.
const DIAGNOSTIC_HINT: &str = "Re-run with -v or --log-file <FILE> to capture details";

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Validation Errors (exit code 4) ===
    /// Field validation failed
    ValidationFailed,
    /// Invalid acks value
    InvalidAcks,
    /// Invalid test mode
    InvalidMode,

    // === Results Errors (exit code 6) ===
    /// Results file not found
    ResultsNotFound,
    /// Results file could not be parsed
    ResultsParseError,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,
    /// Output directory unusable
    OutputDirUnavailable,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidAcks => "INVALID_ACKS",
            Self::InvalidMode => "INVALID_MODE",
            Self::ResultsNotFound => "RESULTS_NOT_FOUND",
            Self::ResultsParseError => "RESULTS_PARSE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::OutputDirUnavailable => "OUTPUT_DIR_UNAVAILABLE",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether fixing the input and retrying can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed | Self::InvalidAcks | Self::InvalidMode
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 4: Validation errors
    /// - 6: Results file errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationFailed | Self::InvalidAcks | Self::InvalidMode => 4,
            Self::ResultsNotFound | Self::ResultsParseError => 6,
            Self::ConfigError | Self::OutputDirUnavailable => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `BenchError`.
    #[must_use]
    pub fn from_error(err: &BenchError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = err.suggestion().map(ToString::to_string).or_else(|| {
            (!err.is_user_recoverable()).then(|| DIAGNOSTIC_HINT.to_string())
        });

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Convert to the JSON envelope printed on stderr.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &BenchError) -> (ErrorCode, Option<Value>) {
        match err {
            BenchError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            BenchError::InvalidAcks { value } => (
                ErrorCode::InvalidAcks,
                Some(json!({"provided": value, "valid_values": ["0", "1", "all"]})),
            ),
            BenchError::InvalidMode { value } => (
                ErrorCode::InvalidMode,
                Some(json!({"provided": value, "valid_values": ["producer", "consumer"]})),
            ),
            BenchError::ResultsNotFound { path } => (
                ErrorCode::ResultsNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            BenchError::ResultsParse { path, reason } => (
                ErrorCode::ResultsParseError,
                Some(json!({"path": path.display().to_string(), "reason": reason})),
            ),
            BenchError::OutputDirUnavailable { path, reason } => (
                ErrorCode::OutputDirUnavailable,
                Some(json!({"path": path.display().to_string(), "reason": reason})),
            ),
            BenchError::Config(_) => (ErrorCode::ConfigError, None),
            BenchError::Io(_) => (ErrorCode::IoError, None),
            BenchError::Json(_) => (ErrorCode::JsonError, None),
            BenchError::Yaml(_) => (ErrorCode::YamlError, None),
            BenchError::WithContext { context, source } => {
                let code = if source.is::<std::io::Error>() {
                    ErrorCode::IoError
                } else {
                    ErrorCode::InternalError
                };
                (code, Some(json!({"context": context})))
            }
            BenchError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}
