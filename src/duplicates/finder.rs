//! Scan orchestration: walk, fingerprint, index.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the complete scan for one root directory:
//!
//! 1. **Validate** - the root must exist and be a directory
//! 2. **Walk** - collect [`FileRecord`]s in traversal order, skipping
//!    files below the minimum size and reporting unreadable entries
//! 3. **Hash** - fingerprint every record on a bounded rayon pool
//! 4. **Index** - a single consumer ingests the results into a fresh
//!    [`DuplicateIndex`] in walk sequence order
//!
//! The indexed parallel iterator collects results in input order, so the
//! index sees records in traversal order no matter which worker finishes
//! first. Group membership order therefore never depends on scheduling.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(1024));
//! let result = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("{} duplicate groups", result.group_count());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use super::groups::{DuplicateIndex, ScanResult};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{FileRecord, Fingerprint, HashError, Hasher, Walker, WalkerConfig};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Interval for "processed N files" log lines.
const PROGRESS_LOG_INTERVAL: usize = 100;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of worker threads for hashing. `1` hashes on the calling thread.
    pub io_threads: usize,
    /// Read chunk size for the hasher.
    pub chunk_size: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("chunk_size", &self.chunk_size)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            chunk_size: crate::scanner::DEFAULT_CHUNK_SIZE,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Create a new configuration with custom hashing thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the hasher read chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the minimum file size; smaller files are ignored.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.walker_config.min_size = min_size;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that abort a scan.
///
/// Per-file problems are not errors at this level; they are counted in
/// the [`ScanResult`].
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("{} is not a valid directory (path not found)", .0.display())]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("{} is not a valid directory", .0.display())]
    NotADirectory(PathBuf),

    /// The hashing thread pool could not be created.
    #[error("Failed to start hashing workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl FinderError {
    /// Whether this error means the scan root was unusable.
    #[must_use]
    pub fn is_invalid_root(&self) -> bool {
        matches!(self, Self::PathNotFound(_) | Self::NotADirectory(_))
    }
}

/// Result of hashing one record.
enum HashOutcome {
    Hashed(Fingerprint),
    Failed(HashError),
    Cancelled,
}

/// Duplicate finder that runs the walk → hash → index pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new().with_chunk_size(config.chunk_size);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Scan `path` and return the duplicate groups found under it.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory (nothing is scanned)
    /// - The scan is interrupted by the shutdown flag
    /// - The hashing pool cannot be started
    pub fn find_duplicates(&self, path: &Path) -> Result<ScanResult, FinderError> {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Scanning directory: {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (records, traversal_skips) = self.walk(path);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut result = self.hash_and_index(records)?;
        result.root = path.to_path_buf();
        result.traversal_skips = traversal_skips;
        result.duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} files considered, {} duplicate groups, {} bytes reclaimable",
            result.total_files_considered,
            result.group_count(),
            result.reclaimable_space()
        );

        Ok(result)
    }

    /// Hash and index an already collected list of records.
    ///
    /// Records are ordered by `seq` before indexing, so group membership
    /// follows sequence numbers whatever order they are passed in. The
    /// returned result has no root and no traversal skips.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Interrupted` if shutdown is requested while
    /// hashing.
    pub fn find_duplicates_from_records(
        &self,
        mut records: Vec<FileRecord>,
    ) -> Result<ScanResult, FinderError> {
        let start_time = Instant::now();
        records.sort_by_key(|r| r.seq);
        let mut result = self.hash_and_index(records)?;
        result.duration = start_time.elapsed();
        Ok(result)
    }

    /// Collect records from the walker, counting skipped entries.
    fn walk(&self, path: &Path) -> (Vec<FileRecord>, usize) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut records = Vec::new();
        let mut skips = 0usize;

        for entry in walker.walk() {
            match entry {
                Ok(record) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(records.len() + 1, &record.path.to_string_lossy());
                    }
                    records.push(record);
                }
                Err(e) => {
                    log::debug!("Traversal skip: {}", e);
                    skips += 1;
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        log::info!(
            "Found {} files at or above {} bytes ({} skipped)",
            records.len(),
            self.config.walker_config.min_size,
            skips
        );

        (records, skips)
    }

    /// Fingerprint every record, then ingest results in sequence order.
    fn hash_and_index(&self, records: Vec<FileRecord>) -> Result<ScanResult, FinderError> {
        let mut result = ScanResult {
            total_files_considered: records.len(),
            ..Default::default()
        };

        if records.is_empty() {
            log::debug!("No files to hash");
            return Ok(result);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_HASHING, records.len());
        }

        let completed = AtomicUsize::new(0);
        let hash_one = |record: FileRecord| -> (FileRecord, HashOutcome) {
            let outcome = self.hash_record(&record, &completed);
            (record, outcome)
        };

        let outcomes: Vec<(FileRecord, HashOutcome)> = if self.config.io_threads <= 1 {
            records.into_iter().map(hash_one).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.io_threads)
                .build()?;
            pool.install(|| records.into_par_iter().map(hash_one).collect())
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Hashing interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        // Single consumer: outcomes arrive in walk order
        let mut index = DuplicateIndex::new();
        let mut last_seq: Option<u64> = None;
        for (record, outcome) in outcomes {
            debug_assert!(last_seq.is_none_or(|prev| prev <= record.seq));
            last_seq = Some(record.seq);

            match outcome {
                HashOutcome::Hashed(fingerprint) => {
                    result.files_hashed += 1;
                    result.bytes_hashed += record.size;
                    index.ingest(record, fingerprint);
                }
                HashOutcome::Failed(e) => {
                    log::warn!("Error reading {}: {}", record.path.display(), e);
                    result.hash_failures += 1;
                }
                HashOutcome::Cancelled => return Err(FinderError::Interrupted),
            }
        }

        log::debug!(
            "Indexed {} files under {} distinct fingerprints",
            index.len(),
            index.group_count()
        );

        result.duplicate_groups = index.into_duplicate_groups();
        Ok(result)
    }

    /// Hash a single record, honouring the shutdown flag.
    fn hash_record(&self, record: &FileRecord, completed: &AtomicUsize) -> HashOutcome {
        if self.config.is_shutdown_requested() {
            return HashOutcome::Cancelled;
        }

        if record.size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({} MB): {}",
                record.size / (1024 * 1024),
                record.path.display()
            );
        }

        let outcome = match self.hasher.full_hash(&record.path) {
            Ok(fp) => HashOutcome::Hashed(fp),
            Err(e) => HashOutcome::Failed(e),
        };

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_LOG_INTERVAL == 0 {
            log::debug!("Processed {} files...", done);
        }
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(done, record.path.to_string_lossy().as_ref());
            callback.on_item_completed(record.size);
        }

        outcome
    }
}
