//! Fingerprint grouping and the per-scan duplicate index.
//!
//! # Overview
//!
//! [`DuplicateIndex`] accumulates `(FileRecord, Fingerprint)` pairs as a
//! scan proceeds. Each distinct fingerprint owns one [`HashGroup`], created
//! the first time the fingerprint is seen. Members are appended in the order
//! they are ingested, and groups are kept in first-seen order, so the
//! finished index reflects traversal order exactly.
//!
//! # Example
//!
//! ```
//! use dupesweep::duplicates::DuplicateIndex;
//! use dupesweep::scanner::{FileRecord, Fingerprint};
//! use std::path::PathBuf;
//!
//! let same = Fingerprint::from_bytes([1; 32]);
//! let other = Fingerprint::from_bytes([2; 32]);
//!
//! let mut index = DuplicateIndex::new();
//! index.ingest(FileRecord::new(PathBuf::from("/a.txt"), 2000, 0), same);
//! index.ingest(FileRecord::new(PathBuf::from("/c.txt"), 1500, 1), other);
//! index.ingest(FileRecord::new(PathBuf::from("/b.txt"), 2000, 2), same);
//!
//! let groups = index.duplicate_groups();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].keep().unwrap().path, PathBuf::from("/a.txt"));
//! assert_eq!(groups[0].wasted_space(), 2000);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::scanner::{FileRecord, Fingerprint};

/// Files sharing one fingerprint, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashGroup {
    /// Content fingerprint shared by every member
    pub fingerprint: Fingerprint,
    /// Members in the order they were visited
    pub members: Vec<FileRecord>,
}

impl HashGroup {
    /// Create an empty group for a fingerprint.
    #[must_use]
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            members: Vec::new(),
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A group is a duplicate group once it has two or more members.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.members.len() > 1
    }

    /// The member that is preserved when duplicates are removed.
    #[must_use]
    pub fn keep(&self) -> Option<&FileRecord> {
        self.members.first()
    }

    /// Every member after the keep representative.
    #[must_use]
    pub fn duplicates(&self) -> &[FileRecord] {
        self.members.get(1..).unwrap_or(&[])
    }

    /// Size in bytes of one member (all members share it).
    #[must_use]
    pub fn size(&self) -> u64 {
        self.members.first().map_or(0, |f| f.size)
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Reclaimable bytes: size of the first member times the copies.
    ///
    /// Zero for groups with fewer than two members.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size() * self.duplicate_count() as u64
    }

    /// Paths of all members, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.members.iter().map(|f| f.path.clone()).collect()
    }
}

/// Fingerprint → ordered group mapping owned by a single scan.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    /// Groups in first-seen order of fingerprint
    groups: Vec<HashGroup>,
    /// Position of each fingerprint's group in `groups`
    positions: HashMap<Fingerprint, usize>,
    /// Records ingested so far
    ingested: usize,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the group for `fingerprint`, creating the group
    /// on first sight.
    pub fn ingest(&mut self, record: FileRecord, fingerprint: Fingerprint) {
        let groups = &mut self.groups;
        let position = *self.positions.entry(fingerprint).or_insert_with(|| {
            groups.push(HashGroup::new(fingerprint));
            groups.len() - 1
        });

        log::trace!(
            "Indexed {} under {}",
            record.path.display(),
            fingerprint.short_hex()
        );
        self.groups[position].members.push(record);
        self.ingested += 1;
    }

    /// Number of records ingested.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ingested
    }

    /// Check if nothing has been ingested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ingested == 0
    }

    /// Number of distinct fingerprints seen.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups with more than one member, in first-seen order.
    #[must_use]
    pub fn duplicate_groups(&self) -> Vec<&HashGroup> {
        self.groups.iter().filter(|g| g.is_duplicate()).collect()
    }

    /// Consume the index, keeping only duplicate groups.
    #[must_use]
    pub fn into_duplicate_groups(self) -> Vec<HashGroup> {
        self.groups
            .into_iter()
            .filter(HashGroup::is_duplicate)
            .collect()
    }
}

/// Outcome of one scan.
///
/// Read by the reporters; the deleter removes members it has deleted.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Root directory that was scanned
    pub root: PathBuf,
    /// Files that passed the size filter and were handed to the hasher
    pub total_files_considered: usize,
    /// Files successfully fingerprinted
    pub files_hashed: usize,
    /// Files that could not be read fully
    pub hash_failures: usize,
    /// Directories or files skipped during traversal
    pub traversal_skips: usize,
    /// Groups with two or more members, in first-seen order
    pub duplicate_groups: Vec<HashGroup>,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
    /// Duration of the scan
    pub duration: Duration,
}

impl ScanResult {
    /// Check if any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.duplicate_groups.is_empty()
    }

    /// Number of duplicate groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.duplicate_groups.len()
    }

    /// Number of files that would be deleted (every member but the first).
    #[must_use]
    pub fn duplicate_file_count(&self) -> usize {
        self.duplicate_groups
            .iter()
            .map(HashGroup::duplicate_count)
            .sum()
    }

    /// Total reclaimable bytes across all groups.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.duplicate_groups
            .iter()
            .map(HashGroup::wasted_space)
            .sum()
    }

    /// Files skipped for any reason (traversal or hashing).
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.traversal_skips + self.hash_failures
    }

    /// Whether every considered file was either hashed or counted as a failure.
    #[must_use]
    pub fn counts_reconcile(&self) -> bool {
        self.total_files_considered == self.files_hashed + self.hash_failures
    }
}
