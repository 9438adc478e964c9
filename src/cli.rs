//! Command-line interface definitions for dupesweep.
//!
//! This module defines all CLI arguments using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory, ignoring files under 1 KiB
//! dupesweep
//!
//! # Scan with a larger size threshold and JSON output
//! dupesweep ~/Downloads --min-size 1MB --output json
//!
//! # Delete duplicates after confirming
//! dupesweep ~/Downloads --delete
//!
//! # Verbose mode for debugging
//! dupesweep -v ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files by content hash.
///
/// Every regular file at or above the minimum size is fingerprinted with
/// BLAKE3; files with equal fingerprints are reported together. The first
/// file of each group in traversal order is kept, the rest may be deleted.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// Minimum file size to check (e.g., 1024, 1KB, 1MiB) [default: 1024]
    ///
    /// Files smaller than this are ignored. KB, MB, GB and TB are decimal
    /// (1KB = 1000 bytes); use KiB, MiB, GiB or TiB for binary units. The
    /// report always prints sizes in binary units (1 KB = 1024 bytes).
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Prompt to delete duplicates (keep first occurrence)
    #[arg(long)]
    pub delete: bool,

    /// Skip the confirmation prompt when deleting
    #[arg(short = 'y', long, requires = "delete")]
    pub yes: bool,

    /// Move duplicates to the system trash instead of unlinking them
    #[arg(long)]
    pub trash: bool,

    /// Number of hashing threads [default: 4]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub io_threads: Option<u64>,

    /// Follow symbolic links during traversal
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports the following formats:
/// - Plain numbers: "1024" (bytes)
/// - Decimal units: "1KB", "1MB", "1GB", "1TB" (powers of 1000)
/// - Binary units: "1KiB", "1MiB", "1GiB", "1TiB" (powers of 1024)
///
/// # Examples
///
/// ```
/// use dupesweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1_000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1_024);
/// assert_eq!(parse_size("1.5KB").unwrap(), 1_500);
/// assert!(parse_size("1.5").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, the number is invalid, or
/// the suffix is unknown.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    // Whole numbers stay in integer arithmetic so large values are exact
    if let Ok(whole) = num_str.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| format!("Size too large: '{s}'"));
    }

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;
    if multiplier == 1 {
        return Err(format!("Byte counts must be whole numbers: '{s}'"));
    }

    let bytes = num * multiplier as f64;
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(format!("Size too large: '{s}'"));
    }
    Ok(bytes as u64)
}
