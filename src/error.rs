//! Structured error handling and exit codes.

use serde::Serialize;

use crate::app::PipelineError;
use crate::duplicates::FinderError;

/// Exit codes for the dupesweep binary.
///
/// - 0: Success (report produced, with or without duplicates)
/// - 1: General error (configuration, I/O on the report streams, ...)
/// - 2: Invalid root (missing path or not a directory)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the scan completed and the report was written.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Invalid root: the scan root does not exist or is not a directory.
    InvalidRoot = 2,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
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
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::InvalidRoot => "DS002",
            Self::Interrupted => "DS130",
        }
    }

    /// Classify a top-level error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(PipelineError::Interrupted) = err.downcast_ref::<PipelineError>() {
            return Self::Interrupted;
        }
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::Interrupted) => Self::Interrupted,
            Some(e) if e.is_invalid_root() => Self::InvalidRoot,
            _ => Self::GeneralError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // Every variant fits in a u8
        Self::from(code.as_i32() as u8)
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
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
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
