//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing directories
//! and collecting the files considered for duplicate detection. The walk
//! is single-threaded and visits children in file-name order, so the
//! sequence of yielded records is stable from one run to the next. The
//! first member of every duplicate group is chosen by this order.
//!
//! # Features
//!
//! - Deterministic, name-sorted depth-first traversal
//! - Configurable symlink following with cycle detection
//! - A file reached by several paths (hardlinks, symlinks) is yielded once
//! - Minimum size filtering
//! - Hidden file filtering
//! - Unreadable directories and files are reported and skipped
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: 1024,
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::hardlink::InodeTracker;
use super::{FileRecord, ScanError, WalkerConfig};

/// Directory walker for sequential file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// The root is not validated here; the finder rejects roots that are
    /// not directories before a walk starts.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries
    /// before the next one is examined.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a file passes the minimum size filter.
    fn passes_size_filter(&self, size: u64) -> bool {
        size >= self.config.min_size
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Returns an iterator over [`FileRecord`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration; an
    /// unreadable directory produces one error and its subtree is skipped.
    /// Records carry consecutive sequence numbers starting at 0.
    ///
    /// Only the first path to each file on disk is yielded; later
    /// hardlinks or symlink aliases of it are skipped.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;
        let mut next_seq: u64 = 0;
        let mut inodes = InodeTracker::new();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        walk_dir
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && entry.depth() > 0 && is_hidden(entry)))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| {
                let result = match entry_result {
                    Ok(entry) => self.process_entry(&entry, &mut inodes)?,
                    Err(e) => Err(self.handle_walk_error(e)),
                };
                Some(result.map(|(path, size)| {
                    let record = FileRecord::new(path, size, next_seq);
                    next_seq += 1;
                    record
                }))
            })
    }

    /// Turn a directory entry into `(path, size)` if it should be hashed.
    fn process_entry(
        &self,
        entry: &DirEntry,
        inodes: &mut InodeTracker,
    ) -> Option<Result<(PathBuf, u64), ScanError>> {
        let path = entry.path();

        // Directories (including the root) are traversed, not reported
        if entry.file_type().is_dir() {
            return None;
        }

        if entry.path_is_symlink() && !self.config.follow_symlinks {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }

        let metadata = if self.config.follow_symlinks {
            std::fs::metadata(path)
        } else {
            std::fs::symlink_metadata(path)
        };

        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_io_error(path, e))),
        };

        // Sockets, FIFOs, devices
        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({} < {}): {}",
                size,
                self.config.min_size,
                path.display()
            );
            return None;
        }

        if inodes.is_seen(&metadata) {
            log::debug!("Skipping second path to an already seen file: {}", path.display());
            return None;
        }

        Some(Ok((path.to_path_buf(), size)))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::warn!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle walkdir errors (unreadable directories, symlink loops).
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if let Some(ancestor) = error.loop_ancestor() {
            log::warn!(
                "Skipping symlink loop: {} -> {}",
                path.display(),
                ancestor.display()
            );
        }

        match error.into_io_error() {
            Some(io_error) => self.handle_io_error(&path, io_error),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("filesystem loop detected"),
            },
        }
    }
}

/// Whether an entry's name starts with a dot.
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
