//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping fingerprinted files by content ([`groups`])
//! - Running the walk → hash → index pipeline ([`finder`])

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError};
pub use groups::{DuplicateIndex, HashGroup, ScanResult};
