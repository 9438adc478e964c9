//! Plain text report for terminals.
//!
//! # Layout
//!
//! ```text
//! ============================================================
//! DUPLICATE FILE REPORT
//! ============================================================
//! Scanned directory: /home/user/photos
//! Total files processed: 3
//! Duplicate groups found: 1
//!
//! Group 1 (Hash: 4d2f8c0a1b3e5f79...):
//!   [KEEP] /home/user/photos/a.jpg
//!   [DUPLICATE] /home/user/photos/b.jpg
//!   Size: 1.95 KB each
//!   Waste: 1.95 KB
//!
//! Total reclaimable space: 1.95 KB
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use yansi::Paint;

use super::format_size;
use crate::actions::delete::{BatchDeleteResult, DeleteOutcome};
use crate::duplicates::ScanResult;

const RULE_WIDTH: usize = 60;

/// Text renderer for a finished scan. Never mutates the result.
pub struct TextReport<'a> {
    result: &'a ScanResult,
    color: bool,
}

impl<'a> TextReport<'a> {
    /// Create a report without colors.
    #[must_use]
    pub fn new(result: &'a ScanResult) -> Self {
        Self {
            result,
            color: false,
        }
    }

    /// Enable or disable colored status tags.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the full report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(w, "{rule}")?;
        writeln!(w, "DUPLICATE FILE REPORT")?;
        writeln!(w, "{rule}")?;
        writeln!(
            w,
            "Scanned directory: {}",
            absolute_root(&self.result.root).display()
        )?;
        writeln!(
            w,
            "Total files processed: {}",
            self.result.total_files_considered
        )?;
        writeln!(w, "Duplicate groups found: {}", self.result.group_count())?;
        if self.result.skipped() > 0 {
            writeln!(
                w,
                "Skipped: {} unreadable during traversal, {} could not be hashed",
                self.result.traversal_skips, self.result.hash_failures
            )?;
        }
        writeln!(w)?;

        if !self.result.has_duplicates() {
            writeln!(w, "No duplicates found!")?;
            return Ok(());
        }

        for (i, group) in self.result.duplicate_groups.iter().enumerate() {
            writeln!(
                w,
                "Group {} (Hash: {}...):",
                i + 1,
                group.fingerprint.short_hex()
            )?;
            for (j, member) in group.members.iter().enumerate() {
                let tag = if j == 0 {
                    self.keep_tag()
                } else {
                    self.duplicate_tag()
                };
                writeln!(w, "  {tag} {}", member.path.display())?;
            }
            writeln!(w, "  Size: {} each", format_size(group.size()))?;
            writeln!(w, "  Waste: {}", format_size(group.wasted_space()))?;
            writeln!(w)?;
        }

        writeln!(
            w,
            "Total reclaimable space: {}",
            format_size(self.result.reclaimable_space())
        )
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn keep_tag(&self) -> String {
        if self.color {
            "[KEEP]".green().bold().to_string()
        } else {
            "[KEEP]".to_string()
        }
    }

    fn duplicate_tag(&self) -> String {
        if self.color {
            "[DUPLICATE]".yellow().to_string()
        } else {
            "[DUPLICATE]".to_string()
        }
    }
}

/// Write the per-file outcome lines and the closing count of a deletion pass.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_deletion_report<W: Write + ?Sized>(
    w: &mut W,
    batch: &BatchDeleteResult,
) -> io::Result<()> {
    for outcome in &batch.outcomes {
        match outcome {
            DeleteOutcome::Deleted(deleted) => {
                writeln!(w, "Deleted: {}", deleted.path.display())?;
            }
            DeleteOutcome::Failed { path, reason } => {
                writeln!(w, "Error deleting {}: {}", path.display(), reason)?;
            }
        }
    }
    if batch.interrupted {
        writeln!(w, "Deletion interrupted, remaining duplicates were left in place.")?;
    }
    writeln!(w)?;
    writeln!(w, "{}", batch.summary())
}

/// Separator printed before the deletion prompt.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_prompt_separator<W: Write + ?Sized>(w: &mut W) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))
}

fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}
