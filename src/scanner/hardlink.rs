//! Detection of paths that lead to a file the walk has already seen.
//!
//! # Overview
//!
//! A hardlink, a symlink to a file, or a file inside a symlinked directory
//! gives one file on disk more than one path. Those paths hash the same
//! but are not copies: deleting the "duplicate" would remove the only data.
//! [`InodeTracker`] remembers the (device, inode) pair of every file the
//! walker yields so later paths to the same file can be skipped.
//!
//! # Platform Support
//!
//! - **Unix**: (device id, inode) from file metadata
//! - **Other**: no detection; the deleter's same-file check still refuses
//!   to remove a path that resolves to the kept file

use std::collections::HashSet;
use std::fs::Metadata;

/// Remembers which files the walk has already yielded.
///
/// Not thread-safe; the walker owns one per walk.
#[derive(Debug, Default)]
pub struct InodeTracker {
    seen: HashSet<InodeKey>,
}

impl InodeTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the file behind `metadata`, returning `true` if it was
    /// already recorded under another path.
    ///
    /// `metadata` must describe the target file, not a symlink.
    pub fn is_seen(&mut self, metadata: &Metadata) -> bool {
        match InodeKey::from_metadata(metadata) {
            Some(key) => !self.seen.insert(key),
            None => false,
        }
    }

    /// Number of distinct files recorded.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Whether this platform can identify files by inode.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InodeKey {
    dev: u64,
    ino: u64,
}

impl InodeKey {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
