//! Duplicate removal, permanently or via the trash crate.
//!
//! # Overview
//!
//! This module removes every member of a duplicate group except the first:
//! - Permanent deletion (default, `std::fs::remove_file`)
//! - Move to system trash (recoverable, `--trash`)
//! - Size verification before each removal
//! - Per-file failures that never abort the batch
//!
//! # Safety
//!
//! The keep representative (first member in traversal order) is never
//! touched. There is no rollback: files removed before a later failure
//! stay removed.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::delete::{delete_duplicates, DeleteConfig, NoopDeleteCallback};
//! use dupesweep::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let mut result = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! let batch = delete_duplicates::<NoopDeleteCallback>(&mut result, &DeleteConfig::default(), None);
//! println!("{}", batch.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::duplicates::{HashGroup, ScanResult};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// The path resolves to the same file as the group's kept member.
    #[error("refusing to delete {0}: it is the same file as the kept copy")]
    SameFileAsKept(PathBuf),

    /// The selection would remove every copy in a group.
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::SameFileAsKept(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// How a duplicate is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Unlink the file.
    #[default]
    Permanent,
    /// Move the file to the platform trash.
    Trash,
}

impl DeleteMode {
    /// Pick the mode from the `--trash` flag.
    #[must_use]
    pub fn from_trash_flag(trash: bool) -> Self {
        if trash {
            Self::Trash
        } else {
            Self::Permanent
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// How the file was removed.
    pub mode: DeleteMode,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, mode: DeleteMode) -> Self {
        Self { path, size, mode }
    }
}

/// Outcome for one file, in the order files were processed.
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    /// The file was removed.
    Deleted(DeleteResult),
    /// The file could not be removed.
    Failed {
        /// Path that was not removed
        path: PathBuf,
        /// Rendered error
        reason: String,
    },
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Per-file outcomes in processing order.
    pub outcomes: Vec<DeleteOutcome>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Files eligible for removal: every group member but the first.
    pub considered: usize,
    /// Shutdown was requested before every eligible file was processed.
    pub interrupted: bool,
}

impl BatchDeleteResult {
    /// Successfully deleted files.
    pub fn successes(&self) -> impl Iterator<Item = &DeleteResult> {
        self.outcomes.iter().filter_map(|o| match o {
            DeleteOutcome::Deleted(result) => Some(result),
            DeleteOutcome::Failed { .. } => None,
        })
    }

    /// Failed deletions with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            DeleteOutcome::Failed { path, reason } => Some((path.as_path(), reason.as_str())),
            DeleteOutcome::Deleted(_) => None,
        })
    }

    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Deleted {} of {} duplicate files",
            self.success_count(),
            self.considered
        )
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Permanent removal or trash.
    pub mode: DeleteMode,
    /// Refuse to delete a file whose size differs from the scanned size.
    pub verify_size: bool,
    /// Checked between files; once set, no further file is removed.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            mode: DeleteMode::Permanent,
            verify_size: true,
            shutdown_flag: None,
        }
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            mode: DeleteMode::Trash,
            ..Self::default()
        }
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self::default()
    }

    /// Enable/disable size verification.
    #[must_use]
    pub fn with_verify_size(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }

    /// Stop the batch when `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, _path: &Path, _index: usize, _total: usize) {}

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &Path, error: &DeleteError);

    /// Called when batch operation completes.
    fn on_complete(&self, _result: &BatchDeleteResult) {}
}

/// Callback that ignores every event.
pub struct NoopDeleteCallback;

impl DeleteProgressCallback for NoopDeleteCallback {
    fn on_delete_success(&self, _path: &Path, _size: u64) {}
    fn on_delete_failure(&self, _path: &Path, _error: &DeleteError) {}
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, DeleteMode::Trash))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if removal is not allowed
/// - `PermanentDeleteFailed` for any other removal failure
///
/// # Example
///
/// ```no_run
/// use dupesweep::actions::delete::permanent_delete;
/// use std::path::PathBuf;
///
/// let path = PathBuf::from("/path/to/file.txt");
/// match permanent_delete(&path) {
///     Ok(result) => println!("Deleted: {}", result.path.display()),
///     Err(e) => eprintln!("Failed: {}", e),
/// }
/// ```
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, DeleteMode::Permanent))
}

/// Delete one file after checking it still has the scanned size.
///
/// # Errors
///
/// - `Modified` if the size changed since the scan
/// - Other errors from [`permanent_delete`] or [`delete_to_trash`]
pub fn delete_verified(
    path: &Path,
    expected_size: u64,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    if config.verify_size {
        let current = fs::metadata(path)
            .map_err(|e| DeleteError::from_io(path, e))?
            .len();
        if current != expected_size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                path.display(),
                expected_size,
                current
            );
            return Err(DeleteError::Modified(path.to_path_buf()));
        }
    }

    match config.mode {
        DeleteMode::Permanent => permanent_delete(path),
        DeleteMode::Trash => delete_to_trash(path),
    }
}

/// Remove every member but the first from each duplicate group.
///
/// Each removal is independent: a failure is logged, recorded, and the
/// batch moves on. Deleted members are dropped from `result`, and groups
/// left with a single member are dropped with them.
///
/// A member that resolves to the same file as the kept member is never
/// removed. When the config's shutdown flag is set, the batch stops before
/// the next file and `interrupted` is set on the result.
pub fn delete_duplicates<C: DeleteProgressCallback>(
    result: &mut ScanResult,
    config: &DeleteConfig,
    callback: Option<&C>,
) -> BatchDeleteResult {
    let mut batch = BatchDeleteResult {
        considered: result.duplicate_file_count(),
        ..Default::default()
    };
    let total = batch.considered;
    let mut index = 0;

    'groups: for group in &mut result.duplicate_groups {
        let Some(keep) = group.keep().map(|f| f.path.clone()) else {
            continue;
        };
        let targets = group.duplicates().to_vec();
        let target_paths: Vec<PathBuf> = targets.iter().map(|f| f.path.clone()).collect();
        if let Err(e) = validate_preserves_copy(&target_paths, &group.paths()) {
            log::error!("Skipping group {}: {}", group.fingerprint.short_hex(), e);
            continue;
        }

        for target in targets {
            if config.is_shutdown_requested() {
                log::warn!("Shutdown requested, stopping deletion");
                batch.interrupted = true;
                break 'groups;
            }

            if let Some(cb) = callback {
                cb.on_before_delete(&target.path, index, total);
            }
            index += 1;

            let outcome = if is_same_file(&target.path, &keep) {
                Err(DeleteError::SameFileAsKept(target.path.clone()))
            } else {
                delete_verified(&target.path, target.size, config)
            };

            match outcome {
                Ok(deleted) => {
                    batch.bytes_freed += deleted.size;
                    if let Some(cb) = callback {
                        cb.on_delete_success(&deleted.path, deleted.size);
                    }
                    remove_member(group, &deleted.path);
                    batch.outcomes.push(DeleteOutcome::Deleted(deleted));
                }
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", target.path.display(), e);
                    if let Some(cb) = callback {
                        cb.on_delete_failure(&target.path, &e);
                    }
                    batch.outcomes.push(DeleteOutcome::Failed {
                        path: target.path,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    result.duplicate_groups.retain(HashGroup::is_duplicate);

    if let Some(cb) = callback {
        cb.on_complete(&batch);
    }

    log::info!("{}", batch.summary());

    batch
}

/// Whether both paths resolve to one file on disk.
///
/// Paths that cannot be resolved are treated as different; the removal
/// itself then reports the error.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Drop a deleted path from a group, never touching the keep member.
fn remove_member(group: &mut HashGroup, path: &Path) {
    if let Some(pos) = group.members.iter().skip(1).position(|m| m.path == path) {
        group.members.remove(pos + 1);
    }
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if every path of the group is selected.
///
/// # Example
///
/// ```
/// use dupesweep::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![
///     PathBuf::from("/original.txt"),
///     PathBuf::from("/copy1.txt"),
///     PathBuf::from("/copy2.txt"),
/// ];
///
/// let selected = vec![PathBuf::from("/copy1.txt"), PathBuf::from("/copy2.txt")];
/// assert!(validate_preserves_copy(&selected, &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    use std::collections::HashSet;

    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        log::debug!(
            "Deletion validated: {} files selected, {} preserved",
            selected_paths.len(),
            preserved_count
        );
        Ok(())
    }
}
