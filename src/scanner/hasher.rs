//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing BLAKE3
//! fingerprints of file contents. Files are read in fixed-size chunks
//! into a single reused buffer, so memory use does not grow with file
//! size. The digest depends only on the byte stream, never on the chunk
//! size used to read it.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! match hasher.full_hash(Path::new("photo.jpg")) {
//!     Ok(fp) => println!("{}", fp),
//!     Err(e) => eprintln!("Warning: {}", e),
//! }
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::{Fingerprint, HashError};

/// Default read chunk size (8 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher that reads in [`DEFAULT_CHUNK_SIZE`] chunks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a different read chunk size. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Current read chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the fingerprint of a file's full contents.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or a read
    /// fails part way through (permission denied, file vanished, I/O
    /// fault). Callers are expected to log and skip the file.
    pub fn full_hash(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let fp = self
            .hash_reader(file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("Hashed {}: {}", path.display(), fp.short_hex());
        Ok(fp)
    }

    /// Fold everything `reader` yields into a fingerprint.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than [`io::ErrorKind::Interrupted`],
    /// which is retried.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut state = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    state.update(&buffer[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(state.finalize().into())
    }

    /// Fingerprint an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(data: &[u8]) -> Fingerprint {
        blake3::hash(data).into()
    }
}
