//! Output formatters for duplicate scan results.
//!
//! This module provides the two report formats:
//! - Plain text for humans ([`text`])
//! - JSON for automation and scripting ([`json`])
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::DuplicateFinder;
//! use dupesweep::output::TextReport;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let result = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let report = TextReport::new(&result);
//! report.write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::JsonOutput;
pub use text::TextReport;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count with base-1024 units and two decimals.
///
/// The largest unit whose scaled value stays below 1024 is chosen, with
/// TB as the ceiling.
///
/// # Examples
///
/// ```
/// use dupesweep::output::format_size;
///
/// assert_eq!(format_size(1000), "1000.00 B");
/// assert_eq!(format_size(2000), "1.95 KB");
/// assert_eq!(format_size(1024 * 1024), "1.00 MB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", SIZE_UNITS[unit])
}
