//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::ClassifyError;

/// Exit codes for the dupfilter application.
///
/// - 0: Success (every input file was classified)
/// - 1: General error (unexpected failure)
/// - 2: Configuration error (no files specified, invalid config)
/// - 3: Partial success (some files were skipped with warnings)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: every input file was classified.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Configuration error: the run could not start.
    ConfigError = 2,
    /// Partial success: some files were skipped.
    PartialSuccess = 3,
    /// Interrupted: Classification was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DF000",
            Self::GeneralError => "DF001",
            Self::ConfigError => "DF002",
            Self::PartialSuccess => "DF003",
            Self::Interrupted => "DF130",
        }
    }

    /// Pick the exit code for an error that reached the binary boundary.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<ClassifyError>() {
            return e.into();
        }
        if err.downcast_ref::<crate::config::ConfigError>().is_some() {
            return Self::ConfigError;
        }
        Self::GeneralError
    }
}

impl From<&ClassifyError> for ExitCode {
    fn from(err: &ClassifyError) -> Self {
        match err {
            ClassifyError::NoFiles => Self::ConfigError,
            ClassifyError::Interrupted => Self::Interrupted,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DF002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
