//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/home/user/photos",
//!   "scanned_at": "2024-05-01T12:00:00+00:00",
//!   "summary": {
//!     "total_files": 3,
//!     "files_hashed": 3,
//!     "hash_failures": 0,
//!     "traversal_skips": 0,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_bytes": 2000,
//!     "bytes_hashed": 5500,
//!     "scan_duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   },
//!   "groups": [
//!     {
//!       "hash": "4d2f...",
//!       "size": 2000,
//!       "waste": 2000,
//!       "files": [
//!         { "path": "/home/user/photos/a.jpg", "status": "keep" },
//!         { "path": "/home/user/photos/b.jpg", "status": "duplicate" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::DuplicateFinder;
//! use dupesweep::error::ExitCode;
//! use dupesweep::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let result = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! let output = JsonOutput::new(&result, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{HashGroup, ScanResult};
use crate::error::ExitCode;
use crate::scanner::Fingerprint;

/// Role of a file within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// First member, preserved by deletion
    Keep,
    /// Any later member
    Duplicate,
}

/// One group member in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path as discovered during the walk
    pub path: String,
    /// Keep or duplicate
    pub status: FileStatus,
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: Fingerprint,
    /// Size of one member in bytes
    pub size: u64,
    /// Reclaimable bytes for this group
    pub waste: u64,
    /// Members in traversal order
    pub files: Vec<JsonFile>,
}

impl JsonDuplicateGroup {
    /// Convert a hash group.
    #[must_use]
    pub fn from_hash_group(group: &HashGroup) -> Self {
        Self {
            hash: group.fingerprint,
            size: group.size(),
            waste: group.wasted_space(),
            files: group
                .members
                .iter()
                .enumerate()
                .map(|(i, member)| JsonFile {
                    path: member.path.to_string_lossy().into_owned(),
                    status: if i == 0 {
                        FileStatus::Keep
                    } else {
                        FileStatus::Duplicate
                    },
                })
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files that passed the size filter
    pub total_files: usize,
    /// Files successfully fingerprinted
    pub files_hashed: usize,
    /// Files that could not be read
    pub hash_failures: usize,
    /// Entries skipped during traversal
    pub traversal_skips: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files that deletion would remove
    pub duplicate_files: usize,
    /// Total reclaimable space in bytes
    pub reclaimable_bytes: u64,
    /// Bytes read while fingerprinting
    pub bytes_hashed: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a scan result and an exit code.
    #[must_use]
    pub fn from_scan_result(result: &ScanResult, exit_code: ExitCode) -> Self {
        Self {
            total_files: result.total_files_considered,
            files_hashed: result.files_hashed,
            hash_failures: result.hash_failures,
            traversal_skips: result.traversal_skips,
            duplicate_groups: result.group_count(),
            duplicate_files: result.duplicate_file_count(),
            reclaimable_bytes: result.reclaimable_space(),
            bytes_hashed: result.bytes_hashed,
            scan_duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Absolute path of the scanned directory
    pub root: String,
    /// When the report was produced
    pub scanned_at: DateTime<Utc>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Duplicate groups in first-seen order
    pub groups: Vec<JsonDuplicateGroup>,
}

impl JsonOutput {
    /// Create a new JSON output from a scan result and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupesweep::duplicates::ScanResult;
    /// use dupesweep::error::ExitCode;
    /// use dupesweep::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&ScanResult::default(), ExitCode::Success);
    /// assert!(output.groups.is_empty());
    /// ```
    #[must_use]
    pub fn new(result: &ScanResult, exit_code: ExitCode) -> Self {
        Self {
            root: absolute_string(&result.root),
            scanned_at: Utc::now(),
            summary: JsonSummary::from_scan_result(result, exit_code),
            groups: result
                .duplicate_groups
                .iter()
                .map(JsonDuplicateGroup::from_hash_group)
                .collect(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        let json = self.to_json_pretty()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn absolute_string(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
